use crate::color::PaletteId;

use super::layout::{Block, ChartSpec, FilterKind, FilterSpec, Metric, PageLayout, TabLayout};

/// Student charts all use Set2 and offer the pie / bar switch.
fn single(column: &'static str, title: &'static str) -> ChartSpec {
    ChartSpec::single(column, title)
        .palette(PaletteId::Set2)
        .toggleable()
}

fn multi(column: &'static str, title: &'static str) -> ChartSpec {
    ChartSpec::multi(column, title)
        .palette(PaletteId::Set2)
        .toggleable()
}

/// The student questionnaire page.
pub fn page() -> PageLayout {
    PageLayout {
        title: "Analyse des données élèves",
        subtitle: "Questionnaire élèves - Académie d'Orléans-Tours",
        filters: vec![
            FilterSpec {
                column: "Classe",
                label: "Classe",
                kind: FilterKind::Categories { presets: Vec::new() },
            },
            FilterSpec {
                column: "Age",
                label: "Age",
                kind: FilterKind::Range,
            },
        ],
        tabs: vec![
            overview_tab(),
            written_tab(),
            oral_tab(),
            comparison_tab(),
            motivation_tab(),
        ],
    }
}

fn overview_tab() -> TabLayout {
    TabLayout {
        title: "Vue d'ensemble",
        blocks: vec![
            Block::Heading("Vue d'ensemble"),
            Block::Metrics(vec![Metric::RowCount {
                label: "Nombre d'élèves",
            }]),
            Block::Metrics(vec![
                Metric::Distinct {
                    label: "Classes représentées",
                    column: "Classe",
                },
                Metric::Distinct {
                    label: "Niveaux représentés",
                    column: "Niveau",
                },
                Metric::Distinct {
                    label: "Établissements",
                    column: "Etablissement",
                },
            ]),
            Block::Chart(single("Classe", "Répartition par classe").bar()),
        ],
    }
}

fn written_tab() -> TabLayout {
    TabLayout {
        title: "Commentaires écrits",
        blocks: vec![
            Block::Heading("Commentaires écrits"),
            Block::Row(vec![
                single(
                    "Freq_comm_ecrit",
                    "Est-ce que tes enseignants écrivent des commentaires (ou appréciations) sur tes copies ou devoirs ?",
                )
                .bar(),
                single(
                    "Lecture_comm_ecrit",
                    "Est-ce que tu lis toujours les commentaires écrits des enseignants ?",
                ),
            ]),
            Block::Row(vec![
                single(
                    "Objectif_commentaire",
                    "Que cherches-tu en priorité dans une appréciation ?",
                ),
                single(
                    "Impact_comm_ecrit",
                    "Est-ce que les commentaires écrits t'aident à progresser ?",
                )
                .bar(),
            ]),
            Block::Chart(
                multi(
                    "Comp_comm_ecrit",
                    "Quand tu ne comprends pas un commentaire écrit, que fais-tu ?",
                )
                .bar(),
            ),
        ],
    }
}

fn oral_tab() -> TabLayout {
    TabLayout {
        title: "Commentaires oraux",
        blocks: vec![
            Block::Heading("Les commentaires oraux."),
            Block::Row(vec![
                single(
                    "Freq_comm_oral",
                    "Est-ce que tes enseignants te font des commentaires à l'oral sur ton travail ?",
                ),
                multi(
                    "Moment_comm_oral",
                    "Quand tes enseignants te font-ils des commentaires oraux sur ton travail ? (Réponses multiples)",
                )
                .bar(),
            ]),
            Block::Row(vec![
                single(
                    "Prof_comm_oral_prive",
                    "Préfères-tu recevoir des commentaires en privé ou devant la classe ?",
                ),
                single(
                    "Gene_comm_oral",
                    "As-tu déjà été mal à l'aise lors de commentaires oraux devant la classe ?",
                )
                .bar(),
            ]),
            Block::Chart(
                multi(
                    "Raison_gene_comm_oral",
                    "Si tu as été mal à l'aise, pourquoi ? (Réponses multiples)",
                )
                .bar(),
            ),
            Block::Note {
                heading: "'Si tu as été mal à l'aise, pourquoi ?' Autres réponses :",
                items: vec![
                    "J'aime pas que cela est dit a voit haute",
                    "remarques des autres camarades (suite à un 21/20)",
                    "c'est un commentaire positif, mais ça me gêne d'avoir eu un compliment, seulement moi ou un petit groupe",
                ],
            },
            Block::Chart(multi(
                "Impact_comm_oral",
                "Est-ce que ces commentaires oraux t'aident à progresser ?",
            )),
        ],
    }
}

fn comparison_tab() -> TabLayout {
    TabLayout {
        title: "Comparaison écrit / oral",
        blocks: vec![
            Block::Heading("Comparaison écrit / oral"),
            Block::Row(vec![
                single(
                    "Pref_ecrit_oral",
                    "Préfères-tu les commentaires oraux ou écrits ?",
                ),
                ChartSpec::single(
                    "Pref_freq_oral",
                    "Est-ce que tu aimerais que tes enseignants te parlent plus souvent de ton travail à l'oral ?",
                )
                .palette(PaletteId::Set2),
            ]),
            Block::Note {
                heading: "'Préfères-tu les commentaires oraux ou écrits ? Pourquoi ?' : 10 groupes de réponses",
                items: vec![
                    "Les oraux m'angoisse",
                    "Parce que c'est pareil",
                    "je ne sais pas",
                    "Car c'est clair",
                    "je trouve ça mieux",
                    "Car mes camarades ne peuvent pas voir",
                    "Je n'ai pas vraiment d'explications à donner, je préfère juste.",
                    "J'aime le fait que les professeurs prennent le temps de rédiger une appréciation : ils ont l'air plus impliqués dans la réussite des élèves",
                    "Cela dépend des commentaires",
                    "car c'est plus personnel",
                ],
            },
            Block::Chart(multi(
                "Besoin_comm_oral",
                "Qu'est-ce que tu aimerais entendre dans les commentaires oraux ? (réponses multiples)",
            )),
        ],
    }
}

fn motivation_tab() -> TabLayout {
    TabLayout {
        title: "Motivation, habitudes de travail",
        blocks: vec![
            Block::Heading("Ressenti et motivation"),
            Block::Row(vec![
                multi(
                    "Motiv_comm",
                    "Comment les commentaires jouent-ils sur ta motivation à préparer au mieux la prochaine évaluation ?",
                ),
                multi(
                    "Peur",
                    "As-tu déjà eu peur de poser une question sur un commentaire que tu ne comprenais pas ?",
                ),
            ]),
            Block::Note {
                heading: "Comment les commentaires jouent-ils sur ta motivation à préparer au mieux la prochaine évaluation ? Pourquoi ? : 3 groupes de réponses.",
                items: vec![
                    "car j'ai envie d'avoir un meilleur commentaire a chaque fois",
                    "Cela me pousse à réussir",
                    "Ne sais pas quoi repondre",
                ],
            },
            Block::Heading("Méthodes de travail"),
            Block::Chart(multi(
                "Methodes_travail",
                "Que fais-tu en général pour préparer une évaluation ? (Réponses multiples)",
            )),
            Block::Note {
                heading: "Quelques réponses au commentaire libre :",
                items: vec![
                    "ils sont gentils, et essaye vraiment de m'aider pour ma part",
                    "Ils faut réussir à être moins sec quand certains parlent",
                    "respecter et avoir une facon de parler aux eleves cela ne les concernent pas tous",
                    "Motivé au lieu de rabaisser",
                ],
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartKind;
    use crate::data::aggregate::AnswerMode;

    #[test]
    fn test_student_page_shape() {
        let page = page();
        assert_eq!(page.tabs.len(), 5);
        assert_eq!(page.filters[1].kind, FilterKind::Range);

        let classe = page.charts().find(|c| c.column == "Classe").unwrap();
        assert_eq!(classe.kind, ChartKind::Bar);
        assert!(classe.toggle);

        let pref = page.charts().find(|c| c.column == "Pref_freq_oral").unwrap();
        assert!(!pref.toggle);
    }

    #[test]
    fn test_chart_keys_unique() {
        let page = page();
        let mut keys: Vec<_> = page.charts().map(|c| c.key()).collect();
        let n = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), n);
        assert!(page.charts().any(|c| c.mode == AnswerMode::multi()));
    }
}
