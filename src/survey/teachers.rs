use crate::color::PaletteId;

use super::layout::{
    Block, ChartSpec, FilterKind, FilterSpec, Metric, PageLayout, Preset, TabLayout,
};

const LYCEE_TYPES: &[&str] = &[
    "LYCEE POLYVALENT",
    "LYCEE GENERAL",
    "LYCEE PROFESSIONNEL",
    "LYCEE GENERAL ET TECHNOLOGIQUE",
    "LPO LYCEE DES METIERS",
    "LP LYCEE DES METIERS",
];

const COLLEGE_TYPES: &[&str] = &["COLLEGE", "SECTION ENSEIGNT PROFESSIONNEL"];

const LYCEE_AND_COLLEGE_TYPES: &[&str] = &[
    "LYCEE POLYVALENT",
    "LYCEE GENERAL",
    "LYCEE PROFESSIONNEL",
    "LYCEE GENERAL ET TECHNOLOGIQUE",
    "LPO LYCEE DES METIERS",
    "LP LYCEE DES METIERS",
    "COLLEGE",
    "SECTION ENSEIGNT PROFESSIONNEL",
];

/// The teacher questionnaire page.
pub fn page() -> PageLayout {
    PageLayout {
        title: "Analyse des données Professeurs",
        subtitle: "Questionnaire enseignants - Académie d'Orléans-Tours",
        filters: vec![
            FilterSpec {
                column: "Type_etab",
                label: "Type d'établissement",
                kind: FilterKind::Categories {
                    presets: vec![
                        Preset {
                            label: "Tous lycées",
                            values: LYCEE_TYPES,
                        },
                        Preset {
                            label: "Tous collèges",
                            values: COLLEGE_TYPES,
                        },
                        Preset {
                            label: "Lycées + collèges",
                            values: LYCEE_AND_COLLEGE_TYPES,
                        },
                    ],
                },
            },
            FilterSpec {
                column: "Departement",
                label: "Département",
                kind: FilterKind::Categories { presets: Vec::new() },
            },
        ],
        tabs: vec![context_tab(), written_tab(), oral_tab()],
    }
}

fn context_tab() -> TabLayout {
    TabLayout {
        title: "Données de contexte",
        blocks: vec![
            Block::Heading("Données de contexte"),
            Block::Metrics(vec![Metric::RowCount {
                label: "Nombre de réponses",
            }]),
            Block::Map {
                latitude: "latitude",
                longitude: "longitude",
            },
            Block::CrossTab {
                rows: "Type_etab",
                stack: "Departement",
                title: "Répartition par type d'établissement et département",
                x_title: "Type d'établissement",
                legend_title: "Départements",
            },
            Block::Row(vec![
                ChartSpec::single("Discipline", "Répartition des enseignants par discipline"),
                ChartSpec::single("Temps_enseignement", "Répartition par temps d'enseignement")
                    .palette(PaletteId::Set2),
            ]),
            Block::Row(vec![
                ChartSpec::multi(
                    "Freq_eval",
                    "Fréquence d'évaluation des enseignants (réponses multiples comptées)",
                )
                .palette(PaletteId::Pastel),
                ChartSpec::single(
                    "grille",
                    "Usage d'une grille, des descripteurs ou des critères d'évaluation prédéfinis",
                )
                .palette(PaletteId::Set2),
            ]),
            Block::Chart(
                ChartSpec::multi(
                    "Preoccupation_IA",
                    "Principales préoccupations concernant l'usage de l'IA pour les commentaires ?",
                )
                .palette(PaletteId::Pastel)
                .bar(),
            ),
        ],
    }
}

fn written_tab() -> TabLayout {
    TabLayout {
        title: "Commentaires écrits",
        blocks: vec![
            Block::Row(vec![
                ChartSpec::single("Freq_comm_ecrit", "Fréquence des commentaires écrits")
                    .palette(PaletteId::Set2),
                ChartSpec::multi(
                    "Difficultes_comm_ecrit",
                    "Difficultés lors des commentaires écrits",
                )
                .palette(PaletteId::Set2)
                .bar(),
            ]),
            Block::Row(vec![
                ChartSpec::single(
                    "Trace_comm_ecrit",
                    "Gardez-vous une trace de vos commentaires écrits ?",
                )
                .palette(PaletteId::Set2),
                ChartSpec::single("Lecture_comm_ecrit", "Lecture des commentaires par les élèves")
                    .palette(PaletteId::Set2),
            ]),
        ],
    }
}

fn oral_tab() -> TabLayout {
    let set2 = |spec: ChartSpec| spec.palette(PaletteId::Set2);
    TabLayout {
        title: "Commentaires oraux",
        blocks: vec![
            Block::Row(vec![
                set2(ChartSpec::single("Freq_comm_oral", "Fréquence des commentaires à l'oral")),
                set2(ChartSpec::multi(
                    "Moment_comm_oral",
                    "A quels moments sont faits les commentaires à l'oral",
                ))
                .bar(),
            ]),
            Block::Row(vec![
                set2(ChartSpec::multi("Objectif_comm_oral", "Objectif du commentaire oral")),
                set2(ChartSpec::multi(
                    "Comprehension_comm_oral",
                    "Compréhension du commentaire oral",
                )),
            ]),
            Block::Row(vec![
                set2(ChartSpec::multi(
                    "Questions_comm_oral",
                    "Les élèves peuvent-ils facilement vous poser des questions sur vos commentaires ?",
                ))
                .bar(),
                set2(ChartSpec::multi(
                    "Eleve_mal_a_l_aise",
                    "Des élèves ont-ils déjà été mal à l'aise lorsque vous donniez un commentaire oral ?",
                )),
            ]),
            Block::Row(vec![
                set2(ChartSpec::multi("Avantages_comm_oral", "Avantages des commentaires oraux.")),
                set2(ChartSpec::multi("Inconveniants_oral", "Inconvénients des commentaires oraux.")),
            ]),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;

    #[test]
    fn test_teacher_page_shape() {
        let page = page();
        assert_eq!(page.tabs.len(), 3);
        assert_eq!(page.filters[0].column, "Type_etab");
        assert_eq!(page.filters[1].column, "Departement");

        let preoccupation = page
            .charts()
            .find(|c| c.column == "Preoccupation_IA")
            .unwrap();
        assert_eq!(preoccupation.kind, ChartKind::Bar);
        assert_eq!(preoccupation.palette, Some(PaletteId::Pastel));
    }

    #[test]
    fn test_presets_are_disjoint_groups() {
        for lycee in LYCEE_TYPES {
            assert!(!COLLEGE_TYPES.contains(lycee));
            assert!(LYCEE_AND_COLLEGE_TYPES.contains(lycee));
        }
        for college in COLLEGE_TYPES {
            assert!(LYCEE_AND_COLLEGE_TYPES.contains(college));
        }
    }
}
