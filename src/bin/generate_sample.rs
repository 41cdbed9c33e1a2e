use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const TEACHER_COUNT: usize = 240;
const STUDENT_COUNT: usize = 600;

/// One questionnaire item and the answers a respondent may pick.
struct Question {
    column: &'static str,
    choices: &'static [&'static str],
    multi: bool,
}

const fn single(column: &'static str, choices: &'static [&'static str]) -> Question {
    Question {
        column,
        choices,
        multi: false,
    }
}

const fn multi(column: &'static str, choices: &'static [&'static str]) -> Question {
    Question {
        column,
        choices,
        multi: true,
    }
}

const FREQUENCY: &[&str] = &["Jamais", "Rarement", "Parfois", "Souvent", "Toujours"];
const YES_NO: &[&str] = &["Oui", "Non"];

const TEACHER_QUESTIONS: &[Question] = &[
    single(
        "Discipline",
        &["Mathématiques", "Français", "Histoire-Géographie", "Anglais", "SVT", "Physique-Chimie", "EPS"],
    ),
    single("Temps_enseignement", &["Temps plein", "Temps partiel"]),
    multi("Freq_eval", &["Hebdomadaire", "Mensuelle", "Fin de séquence", "Trimestrielle"]),
    single("grille", YES_NO),
    multi(
        "Preoccupation_IA",
        &["Triche", "Perte d'autonomie", "Fiabilité", "Données personnelles", "Aucune"],
    ),
    single("Freq_comm_ecrit", FREQUENCY),
    multi(
        "Difficultes_comm_ecrit",
        &["Manque de temps", "Nombre de copies", "Formulation", "Aucune"],
    ),
    single("Trace_comm_ecrit", &["Sur la copie", "Sur l'ENT", "Dans le cahier"]),
    single("Lecture_comm_ecrit", FREQUENCY),
    single("Freq_comm_oral", FREQUENCY),
    multi("Moment_comm_oral", &["Pendant le cours", "En fin de cours", "Lors de la remise des copies"]),
    multi("Objectif_comm_oral", &["Encourager", "Corriger", "Expliquer", "Orienter le travail"]),
    multi("Comprehension_comm_oral", &["Reformulation", "Questions", "Exemple au tableau"]),
    multi("Questions_comm_oral", &["En classe", "En privé", "Rarement"]),
    multi("Eleve_mal_a_l_aise", &["Timidité", "Regard des autres", "Peur de l'erreur"]),
    multi("Avantages_comm_oral", &["Rapidité", "Interaction", "Personnalisation"]),
    multi("Inconveniants_oral", &["Pas de trace", "Oubli", "Temps en classe"]),
];

const STUDENT_QUESTIONS: &[Question] = &[
    single("Freq_comm_ecrit", FREQUENCY),
    single("Lecture_comm_ecrit", &["Toujours", "Souvent", "Parfois", "Jamais"]),
    single("Objectif_commentaire", &["Progresser", "Comprendre la note", "Je ne sais pas"]),
    single("Impact_comm_ecrit", &["Beaucoup", "Un peu", "Pas du tout"]),
    multi(
        "Comp_comm_ecrit",
        &["Écriture illisible", "Vocabulaire difficile", "Trop court", "Aucune difficulté"],
    ),
    single("Freq_comm_oral", FREQUENCY),
    multi("Moment_comm_oral", &["Pendant le cours", "En fin de cours", "Lors de la remise des copies"]),
    single("Prof_comm_oral_prive", YES_NO),
    single("Gene_comm_oral", YES_NO),
    multi("Raison_gene_comm_oral", &["Devant la classe", "Peur du jugement", "Timidité"]),
    multi("Impact_comm_oral", &["Motivation", "Confiance", "Compréhension", "Aucun"]),
    single("Pref_ecrit_oral", &["Écrit", "Oral", "Les deux"]),
    single("Pref_freq_oral", &["Plus souvent", "Autant", "Moins souvent"]),
    multi("Besoin_comm_oral", &["Explications", "Encouragements", "Conseils de méthode"]),
    multi("Motiv_comm", &["Les notes", "Les encouragements", "Les progrès"]),
    multi("Peur", &["Mauvaise note", "Jugement du professeur", "Jugement des camarades"]),
    multi("Methodes_travail", &["Fiches", "Exercices", "Relecture du cours", "Travail en groupe"]),
];

const ESTABLISHMENT_TYPES: &[&str] = &[
    "COLLEGE",
    "LYCEE GENERAL",
    "LYCEE GENERAL ET TECHNOLOGIQUE",
    "LYCEE POLYVALENT",
    "LYCEE PROFESSIONNEL",
    "LP LYCEE DES METIERS",
    "SECTION ENSEIGNT PROFESSIONNEL",
];

/// (name, latitude, longitude) of each department's prefecture.
const DEPARTMENTS: &[(&str, f64, f64)] = &[
    ("Cher", 47.081, 2.399),
    ("Eure-et-Loir", 48.446, 1.489),
    ("Indre", 46.811, 1.691),
    ("Indre-et-Loire", 47.394, 0.685),
    ("Loir-et-Cher", 47.586, 1.335),
    ("Loiret", 47.903, 1.909),
];

/// (class, level), youngest first.
const CLASSES: &[(&str, &str)] = &[
    ("6A", "6e"),
    ("6B", "6e"),
    ("5A", "5e"),
    ("5B", "5e"),
    ("4A", "4e"),
    ("4B", "4e"),
    ("3A", "3e"),
    ("3B", "3e"),
    ("2nde1", "2nde"),
    ("1re1", "1re"),
    ("Tle1", "Tle"),
];

const SCHOOLS: &[&str] = &[
    "Collège Jean Zay",
    "Collège George Sand",
    "Lycée Descartes",
    "Lycée Pothier",
    "Lycée Balzac",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn index(&mut self, len: usize) -> usize {
        (self.next_u64() % len as u64) as usize
    }

    /// Skewed towards the first choices so charts are not flat.
    fn pick<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        let a = self.index(choices.len());
        let b = self.index(choices.len());
        choices[a.min(b)]
    }
}

/// One answer cell; about 5% of respondents skip each question.
fn answer(rng: &mut SimpleRng, question: &Question) -> String {
    if rng.next_f64() < 0.05 {
        return String::new();
    }
    if !question.multi {
        return rng.pick(question.choices).to_string();
    }
    let mut picked: Vec<&str> = question
        .choices
        .iter()
        .copied()
        .filter(|_| rng.next_f64() < 0.4)
        .collect();
    if picked.is_empty() {
        picked.push(rng.pick(question.choices));
    }
    picked.join(", ")
}

fn write_csv(path: &Path, header: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn teachers(rng: &mut SimpleRng) -> (Vec<String>, Vec<Vec<String>>) {
    let mut header: Vec<String> = ["", "UAI", "Type_etab", "Departement", "latitude", "longitude"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(TEACHER_QUESTIONS.iter().map(|q| q.column.to_string()));

    let rows = (0..TEACHER_COUNT)
        .map(|i| {
            let establishment = rng.index(40);
            let (department, lat, lon) = DEPARTMENTS[establishment % DEPARTMENTS.len()];
            let etab_type = ESTABLISHMENT_TYPES[establishment % ESTABLISHMENT_TYPES.len()];
            let mut row = vec![
                i.to_string(),
                format!("0{:06}X", 450_000 + establishment),
                etab_type.to_string(),
                department.to_string(),
                format!("{:.4}", rng.gauss(lat, 0.15)),
                format!("{:.4}", rng.gauss(lon, 0.2)),
            ];
            row.extend(TEACHER_QUESTIONS.iter().map(|q| answer(rng, q)));
            row
        })
        .collect();
    (header, rows)
}

fn students(rng: &mut SimpleRng) -> (Vec<String>, Vec<Vec<String>>) {
    let mut header: Vec<String> = ["Classe", "Niveau", "Etablissement", "Age"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(STUDENT_QUESTIONS.iter().map(|q| q.column.to_string()));

    let rows = (0..STUDENT_COUNT)
        .map(|_| {
            let class_idx = rng.index(CLASSES.len());
            let (class, level) = CLASSES[class_idx];
            let age = 11 + class_idx as i64 * 7 / CLASSES.len() as i64 + rng.index(2) as i64;
            let school = SCHOOLS[rng.index(SCHOOLS.len())];
            let mut row = vec![
                class.to_string(),
                level.to_string(),
                school.to_string(),
                age.to_string(),
            ];
            row.extend(STUDENT_QUESTIONS.iter().map(|q| answer(rng, q)));
            row
        })
        .collect();
    (header, rows)
}

/// Same student table as Parquet: `Age` as Int64, everything else Utf8.
fn write_parquet(path: &Path, header: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut fields = Vec::with_capacity(header.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(header.len());

    for (col, name) in header.iter().enumerate() {
        if name == "Age" {
            let values: Vec<Option<i64>> = rows.iter().map(|r| r[col].parse().ok()).collect();
            fields.push(Field::new(name, DataType::Int64, true));
            columns.push(Arc::new(Int64Array::from(values)));
        } else {
            let values: Vec<Option<&str>> = rows
                .iter()
                .map(|r| Some(r[col].as_str()).filter(|s| !s.is_empty()))
                .collect();
            fields.push(Field::new(name, DataType::Utf8, true));
            columns.push(Arc::new(StringArray::from(values)));
        }
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("Failed to create RecordBatch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let dir = Path::new("Data");
    std::fs::create_dir_all(dir).context("Failed to create Data directory")?;

    let (header, rows) = teachers(&mut rng);
    write_csv(&dir.join("profs.csv"), &header, &rows)?;
    println!("Wrote {} teacher answers to Data/profs.csv", rows.len());

    let (header, rows) = students(&mut rng);
    write_csv(&dir.join("eleves.csv"), &header, &rows)?;
    write_parquet(&dir.join("eleves.parquet"), &header, &rows)?;
    println!(
        "Wrote {} student answers to Data/eleves.csv and Data/eleves.parquet",
        rows.len()
    );
    Ok(())
}
