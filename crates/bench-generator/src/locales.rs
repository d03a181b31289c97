//! Value pools for the three locales mixed into generated data.

/// A locale's name and company vocabulary.
#[derive(Debug)]
pub struct Locale {
    pub code: &'static str,
    pub first_names: &'static [&'static str],
    pub last_names: &'static [&'static str],
    pub company_suffixes: &'static [&'static str],
    /// Joins two surnames in partnership-style company names.
    pub conjunction: &'static str,
    pub free_email_domains: &'static [&'static str],
    pub tlds: &'static [&'static str],
}

pub const IT_IT: Locale = Locale {
    code: "it_IT",
    first_names: &[
        "Alessandro", "Andrea", "Chiara", "Davide", "Elena", "Federica", "Francesco",
        "Giulia", "Giuseppe", "Lorenzo", "Luca", "Marco", "Martina", "Matteo", "Niccolò",
        "Paola", "Roberta", "Sara", "Simone", "Valentina",
    ],
    last_names: &[
        "Bianchi", "Colombo", "Conti", "Costa", "De Luca", "Esposito", "Ferrari", "Fontana",
        "Gallo", "Greco", "Lombardi", "Mancini", "Marino", "Moretti", "Ricci", "Rizzo",
        "Romano", "Rossi", "Russo", "Villa",
    ],
    company_suffixes: &["S.p.A.", "s.r.l.", "e figli", "Group"],
    conjunction: "e",
    free_email_domains: &["libero.it", "tiscali.it", "virgilio.it", "gmail.com"],
    tlds: &["it", "com", "net"],
};

pub const ES_ES: Locale = Locale {
    code: "es_ES",
    first_names: &[
        "Alejandro", "Ana", "Carlos", "Carmen", "David", "Elena", "Francisco", "Isabel",
        "Javier", "José", "Laura", "Lucía", "Manuel", "María", "Miguel", "Pablo", "Pilar",
        "Raquel", "Sergio", "Sofía",
    ],
    last_names: &[
        "Alonso", "Díaz", "Fernández", "García", "Gómez", "González", "Hernández",
        "Jiménez", "López", "Martín", "Martínez", "Moreno", "Muñoz", "Navarro", "Pérez",
        "Rodríguez", "Romero", "Ruiz", "Sánchez", "Torres",
    ],
    company_suffixes: &["S.A.", "S.L.", "S.L.L.", "S.Coop."],
    conjunction: "y",
    free_email_domains: &["gmail.com", "hotmail.com", "yahoo.es"],
    tlds: &["es", "com", "net", "org"],
};

pub const EN_US: Locale = Locale {
    code: "en_US",
    first_names: &[
        "Amanda", "Brian", "Christopher", "Daniel", "Emily", "Heather", "James", "Jennifer",
        "Jessica", "John", "Joshua", "Karen", "Kevin", "Linda", "Matthew", "Michael",
        "Robert", "Sarah", "Stephanie", "William",
    ],
    last_names: &[
        "Anderson", "Brown", "Davis", "Garcia", "Harris", "Jackson", "Johnson", "Jones",
        "Martin", "Miller", "Moore", "Smith", "Taylor", "Thomas", "Thompson", "Walker",
        "White", "Williams", "Wilson", "Young",
    ],
    company_suffixes: &["Inc", "LLC", "Ltd", "PLC", "Group"],
    conjunction: "and",
    free_email_domains: &["gmail.com", "yahoo.com", "hotmail.com"],
    tlds: &["com", "net", "org", "biz", "info"],
};

pub const LOCALES: [&Locale; 3] = [&IT_IT, &ES_ES, &EN_US];

/// Lowercase ASCII form of a name, suitable for emails and domains.
///
/// Accented Latin letters are folded to their base letter; anything else
/// that is not alphanumeric is dropped.
pub fn ascii_slug(value: &str) -> String {
    value
        .chars()
        .filter_map(|c| {
            let folded = match c {
                'à' | 'á' | 'â' | 'ä' | 'À' | 'Á' => 'a',
                'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' => 'e',
                'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' => 'i',
                'ò' | 'ó' | 'ô' | 'ö' | 'Ò' | 'Ó' => 'o',
                'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' => 'u',
                'ñ' | 'Ñ' => 'n',
                'ç' | 'Ç' => 'c',
                other => other,
            };
            folded
                .is_ascii_alphanumeric()
                .then(|| folded.to_ascii_lowercase())
        })
        .collect()
}
