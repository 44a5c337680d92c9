//! Curated barangay knowledge base.
//!
//! Static reference blocks about Barangay Amungan plus the keyword
//! probes that route a message to them. A query can match several
//! domains at once; `relevant_sections` returns every match so the
//! reply can present each block under its own heading.

/// A curated block with its display heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub body: &'static str,
}

pub const OFFICIALS_INFO: &str = "\
Barangay Amungan Officials:

Punong Barangay (also called Captain, Kapitan, Cap, or Kap): Richard N. Redondo

Barangay Kagawad (Councilors):
- Joseph D. Flauta
- Walter L. Olipane
- Richard D. Arquero
- Arnold R. Lonzanida
- Jesieline C. Sibug
- Darius S. Susa Sr.
- Russel S. Aramay

Barangay Secretary: Darrel Castrence
Barangay Treasurer: Rodalyn E. Gutierrez

Sangguniang Kabataan (SK) Officials (in hierarchical order):
- Carl Eric B. Rico (SK Chairperson)
- Arnel Jake E. Mercado
- Danica D. Barried
- Marjurine R. Dagsaan
- Grace E. Ednalaga
- Christian Lloyd R. Susa
- Criezel Mae P. Santos
- Gabriel Vonz M. Macalinao
- Patricia Leigh M. Rebultan
- Ellysa Famisan

Purok Presidents (Barangay Amungan has a total of 14 puroks):
- Purok 1: Felimon V. Aramay Jr.
- Purok 2: Joselyn Alarma
- Purok 3: Alvin Abadam
- Purok 4: Moises S. Castrence
- Purok 5: Carlos B. Dagun
- Purok 6: Lelyrose Arcino
- Purok 7: Belen A. Famisan
- Purok 8: Marissa Cristobal
- Purok 9: Jean Abad
- Purok 10: Gilbert Baluyot
- Purok 11: Jerry P. Cristobal
- Purok 12: Henry Adona
- Purok 13: Nelsa T. Aramay
- Purok 14: Jayson Mora";

pub const POPULATION_INFO: &str = "\
Population Information of Barangay Amungan by Age Range:

Under 5 Years Old: Male 443, Female 412, Total 855
5 - 9 Years Old: Male 481, Female 488, Total 969
10 - 14 Years Old: Male 571, Female 533, Total 1,104
15 - 19 Years Old: Male 581, Female 563, Total 1,144
20 - 24 Years Old: Male 629, Female 561, Total 1,190
25 - 29 Years Old: Male 591, Female 607, Total 1,198
30 - 34 Years Old: Male 517, Female 510, Total 1,027
35 - 39 Years Old: Male 490, Female 438, Total 928
40 - 44 Years Old: Male 401, Female 422, Total 823
45 - 49 Years Old: Male 345, Female 393, Total 738
50 - 54 Years Old: Male 285, Female 294, Total 579
55 - 59 Years Old: Male 268, Female 300, Total 568
60 - 64 Years Old: Male 257, Female 230, Total 487
65 - 69 Years Old: Male 201, Female 192, Total 393
70 - 74 Years Old: Male 124, Female 152, Total 276
75 - 79 Years Old: Male 63, Female 88, Total 151
80 Years Old and Over: Male 43, Female 97, Total 140";

pub const HISTORY_INFO: &str = "\
Short History of Barangay Amungan:

Barangay Amungan was created based on RA 3590 which was ratified on June 23, 1963.
It is divided into thirteen (13) puroks and one (1) sitio. It has a total area of
eighteen (18) square kilometers and is approximately six (6) kilometers from the
town center of Iba, Zambales.

The barangay's terrain is gently sloping downward with ten (10) to twenty (20)
meters above sea level. The other eight (8) kilometers from the east are upward
sloping. The hills have heights ranging from twenty (20) to two hundred (200)
meters in coverage.

The residents consist of three ethnic groups: Zambals, Ilocanos, and Tagalogs.
They can speak the international language in addition to their ethnic dialects.

Amungan is an agricultural barangay and the main livelihood of the citizens is
farming and fishing. Additional income comes from raising animals such as pigs,
cattle, carabao, goats, chickens, and making bagoong (fish paste).

Legend of the Name \"Amungan\":
It is said that a Chinese merchant came to the place to sell his goods and fell
for a beautiful maiden. Her parents at first refused the romance and the girl
became seriously ill. When the parents relented, the suitor's visits led to her
quick recovery and they married, and the merchant settled in the place. From
this legend the barangay was called \"Amu-an\", because anyone who goes there
becomes captivated and tamed, and every visitor wants to stay. Over time
\"Amu-an\" became the more proper name \"Amungan\".

Legal Basis for Establishment: RA 3590 - June 23, 1963
Festival/Celebration: Feast of San Isidro Labrador - May 15";

pub const GEOGRAPHY_INFO: &str = "\
Geographic Location of Barangay Amungan:

Barangay Amungan is approximately 6 kilometers from the town center of Iba.
It is surrounded by the following:

North: Barangay San Agustin
South: Barangay Bangatalinga
East: Zambales Mountain
West: South China Sea

Classification: rural, agricultural, coastal; not upland.

Total Land Area: 18 square kilometers
- Residential: 9 square kilometers
- Agricultural: 7 square kilometers
- Commercial: 0.5 square kilometers
- Others: 1.3 square kilometers";

pub const DEMOGRAPHICS_2020_INFO: &str = "\
Demographic Information (2020 Census):

Total Population: 11,332
- Male: 6,053
- Female: 5,279

Number of Families: 3,300
Number of Households: 2,655

Religious Distribution:
- Roman Catholic: 75%
- Protestant: 15%
- Iglesia Ni Cristo: 5%
- Baptist: 1%
- Jehovah's Witnesses: 1%
- Islam: 1%
- Others: 2%";

pub const FACILITIES_INFO: &str = "\
Main Facilities in Barangay Amungan:

Electricity: ZAMECO (Zambales Electric Cooperative)

Water Supply: jetmatic pumps, pitcher pumps, motor pumps

Communication: cellphone networks, hand-held radio

Transportation: buses (big and mini), jeepneys, tricycles, single motorcycles";

pub const ECONOMY_INFO: &str = "\
Economic Data (2022):

Annual Barangay Income: ₱13,718,953.00

Sources of Income:
Internal Revenue (RPT, Business, etc.): ₱320,000.00
External Revenue:
- Internal Revenue Allotment (IRA): ₱13,054,953.00
- Tax on Sand, Gravel and Others: ₱30,000.00
- Other Sources: ₱30,000.00

Main Occupations:
- Farming: 40%
- Fishing: 30%
- Business: 15%
- Employment: 10%
- Others: 5%

Financial Institutions (with access): Landbank of the Philippines,
Cooperative Bank of Zambales, Producers Bank, Bank of Commerce, Metro Bank,
Bank of Philippine Islands, East West Bank, Banco de Oro, Grameen Bank

Lending Institutions: Fundline, ASA, PAG-ASA, DSPI, L-5, Free will,
GM Bank, CARD";

pub const POLITICS_INFO: &str = "\
Political Information:

Congressional District: Second District (Pangalawang Distrito)
Number of Puroks: 13
Number of Sitios: 1
Registered Voters (Last Election): 5,512
Election Precincts (Last Election): 17

Current Barangay Officials (from document):
Punong Barangay: Hon. Richard N. Redondo
Kagawad:
- Hon. Joseph D. Flauta
- Hon. Richard D. Arquero
- Hon. Paulo A. Fortin
- Hon. Walter L. Olipane
- Hon. Procopio M. Reyes
- Hon. Gemma D. Arbolente
- Hon. Jesieline C. Sibug

SK Chairperson: Hon. Mariella M. Enriquez
Secretary: Darrel C. Castrence
Treasurer: Rodalyn E. Gutierrez";

pub const SCHOOLS_INFO: &str = "\
List of Public and Private Schools in Barangay Amungan:

Elementary Schools:
1. Lawak Elementary School
2. Amungan Elementary School
3. Dampay Elementary School
4. Doña Obieta Elementary School

High Schools:
5. Amungan National High School

Day Care Centers:
6. Amungan Day Care Center I (Barangay Plaza, Purok 3)
7. Amungan Day Care Center II (Purok 2, Lawak)
8. Amungan Day Care Center III (Sitio Olpoy, Purok 14)";

const OFFICIAL_TERMS: &[&str] = &[
    "official",
    "officials",
    "barangay official",
    "barangay officials",
    "kagawad",
    "councilor",
    "council",
    "secretary",
    "treasurer",
    "captain",
    "kapitan",
    "chairman",
    "punong",
    "kap ",
    "cap ",
    "sk",
    "sangguniang kabataan",
    "youth council",
    "youth",
    "purok",
    "purok president",
    "purok leader",
    "president",
];

const OFFICIAL_NAMES: &[&str] = &[
    "redondo", "flauta", "olipane", "arquero", "lonzanida", "sibug", "susa", "aramay",
    "castrence", "gutierrez", "rico", "mercado", "barried", "dagsaan", "ednalaga", "santos",
    "macalinao", "rebultan", "famisan", "alarma", "abadam", "dagun", "arcino", "abad",
    "baluyot", "cristobal", "adona", "mora",
];

const POPULATION_TERMS: &[&str] = &[
    "population",
    "demographics",
    "residents",
    "people",
    "citizens",
    "age",
    "gender",
    "male",
    "female",
    "men",
    "women",
    "boys",
    "girls",
    "statistics",
    "census",
    "how many people",
    "total population",
];

const HISTORY_TERMS: &[&str] = &[
    "history",
    "kasaysayan",
    "alamat",
    "legend",
    "story",
    "origin",
    "established",
    "created",
    "founded",
    "ra 3590",
    "1963",
    "chinese merchant",
    "amu-an",
    "amungan name",
    "how named",
    "why called",
    "san isidro",
    "festival",
    "celebration",
];

const GEOGRAPHY_TERMS: &[&str] = &[
    "location",
    "geography",
    "boundary",
    "boundaries",
    "north",
    "south",
    "west",
    "mountains",
    "sea",
    "coastal",
    "area",
    "square",
    "kilometers",
    "terrain",
    "elevation",
    "hills",
    "land use",
    "residential",
    "agricultural",
    "commercial",
    "san agustin",
    "bangatalinga",
    "zambales mountain",
    "south china sea",
];

const DEMOGRAPHICS_2020_TERMS: &[&str] = &[
    "2020",
    "census",
    "religion",
    "religious",
    "catholic",
    "protestant",
    "iglesia",
    "baptist",
    "jehovah",
    "islam",
    "families",
    "households",
    "11332",
    "11,332",
];

const FACILITY_TERMS: &[&str] = &[
    "facilities",
    "electricity",
    "water",
    "communication",
    "transport",
    "zameco",
    "jetmatic",
    "pump",
    "cellphone",
    "radio",
    "bus",
    "jeepney",
    "tricycle",
    "motorcycle",
];

const ECONOMY_TERMS: &[&str] = &[
    "economy",
    "economic",
    "income",
    "revenue",
    "budget",
    "ira",
    "occupation",
    "livelihood",
    "farming",
    "fishing",
    "business",
    "employment",
    "bank",
    "lending",
    "financial",
    "institution",
    "landbank",
    "peso",
    "₱",
    "13718953",
];

const POLITICAL_TERMS: &[&str] = &[
    "district",
    "congressional",
    "puroks",
    "sitios",
    "voters",
    "precincts",
    "election",
    "political",
    "second district",
    "pangalawang distrito",
    "5512",
    "17 precincts",
];

const SCHOOL_TERMS: &[&str] = &[
    "school",
    "schools",
    "education",
    "elementary",
    "high school",
    "daycare",
    "day care",
    "lawak",
    "dampay",
    "national high",
    "dona obieta",
    "doña obieta",
    "learning",
    "students",
];

fn contains_any(query_lower: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| query_lower.contains(term))
}

pub fn is_about_officials(query: &str) -> bool {
    let query_lower = query.to_lowercase();
    contains_any(&query_lower, OFFICIAL_TERMS) || contains_any(&query_lower, OFFICIAL_NAMES)
}

pub fn is_about_population(query: &str) -> bool {
    contains_any(&query.to_lowercase(), POPULATION_TERMS)
}

pub fn is_about_history(query: &str) -> bool {
    contains_any(&query.to_lowercase(), HISTORY_TERMS)
}

pub fn is_about_geography(query: &str) -> bool {
    contains_any(&query.to_lowercase(), GEOGRAPHY_TERMS)
}

pub fn is_about_demographics_2020(query: &str) -> bool {
    contains_any(&query.to_lowercase(), DEMOGRAPHICS_2020_TERMS)
}

pub fn is_about_facilities(query: &str) -> bool {
    contains_any(&query.to_lowercase(), FACILITY_TERMS)
}

pub fn is_about_economy(query: &str) -> bool {
    contains_any(&query.to_lowercase(), ECONOMY_TERMS)
}

pub fn is_about_politics(query: &str) -> bool {
    contains_any(&query.to_lowercase(), POLITICAL_TERMS)
}

pub fn is_about_schools(query: &str) -> bool {
    contains_any(&query.to_lowercase(), SCHOOL_TERMS)
}

/// Collect every curated block the query touches, in a fixed order.
pub fn relevant_sections(query: &str) -> Vec<Section> {
    let mut sections = Vec::new();

    if is_about_history(query) {
        sections.push(Section {
            title: "History",
            body: HISTORY_INFO,
        });
    }
    if is_about_geography(query) {
        sections.push(Section {
            title: "Geography",
            body: GEOGRAPHY_INFO,
        });
    }
    if is_about_demographics_2020(query) {
        sections.push(Section {
            title: "Demographics (2020)",
            body: DEMOGRAPHICS_2020_INFO,
        });
    }
    if is_about_facilities(query) {
        sections.push(Section {
            title: "Facilities",
            body: FACILITIES_INFO,
        });
    }
    if is_about_economy(query) {
        sections.push(Section {
            title: "Economy",
            body: ECONOMY_INFO,
        });
    }
    if is_about_politics(query) {
        sections.push(Section {
            title: "Politics",
            body: POLITICS_INFO,
        });
    }
    if is_about_schools(query) {
        sections.push(Section {
            title: "Schools",
            body: SCHOOLS_INFO,
        });
    }
    if is_about_officials(query) {
        sections.push(Section {
            title: "Officials",
            body: OFFICIALS_INFO,
        });
    }
    if is_about_population(query) {
        sections.push(Section {
            title: "Population",
            body: POPULATION_INFO,
        });
    }

    sections
}

/// Reference corpus embedded into the freeform system prompt.
pub fn reference_corpus() -> String {
    format!("{}\n\n{}", OFFICIALS_INFO, POPULATION_INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_officials_by_title_and_name() {
        assert!(is_about_officials("Who is the kagawad here?"));
        assert!(is_about_officials("Is Redondo still the captain?"));
        assert!(!is_about_officials("How do I get a clearance?"));
    }

    #[test]
    fn test_population_terms() {
        assert!(is_about_population("What is the total population?"));
        assert!(is_about_population("how many female residents"));
        assert!(!is_about_population("show me the plaza"));
    }

    #[test]
    fn test_multiple_domains_combine() {
        let sections = relevant_sections("List every Kagawad and the population by age");
        let titles: Vec<_> = sections.iter().map(|s| s.title).collect();
        assert!(titles.contains(&"Officials"));
        assert!(titles.contains(&"Population"));
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(relevant_sections("kumusta").is_empty());
    }

    #[test]
    fn test_history_and_schools() {
        assert!(is_about_history("what is the alamat of the name"));
        assert!(is_about_schools("where is Dampay elementary"));
    }
}
