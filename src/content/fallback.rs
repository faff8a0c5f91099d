use serde_json::{json, Value};

use super::View;

/// Placeholder records shown when a feed cannot be fetched.
pub fn records(view: View) -> Vec<Value> {
    let records = match view {
        View::Roster => json!([
            {
                "id": "roland-wilhelm",
                "name": "Roland Wilhelm",
                "role": "PI / Lab Lead",
                "focus": "Microbiome ecology, data standards, stable isotope probing",
                "photoUrl": "",
                "links": { "website": "https://ag.purdue.edu/directory/rcwilhel" },
                "publish": true
            }
        ]),
        View::Quotes => json!([
            {
                "text": "We study microbes as infrastructure: invisible, essential, and shaped by management.",
                "attribution": "MEME Lab",
                "publish": true
            },
            {
                "text": "Data are not a byproduct; they are a deliverable.",
                "attribution": "Lab principle",
                "publish": true
            }
        ]),
        View::Quiz => json!([
            {
                "id": "base-cation-k",
                "question": "Which is typically considered a base cation in soils?",
                "choices": ["K⁺", "NO₃⁻", "Cl⁻", "H₂O"],
                "answerIndex": 0,
                "explanation": "K⁺ is a base cation along with Ca²⁺, Mg²⁺, Na⁺ (context-dependent).",
                "tags": ["soil-chemistry"],
                "publish": true
            },
            {
                "id": "sip-goal",
                "question": "In stable isotope probing (SIP), the primary goal is to:",
                "choices": [
                    "Separate active from inactive taxa by isotope incorporation",
                    "Measure soil texture",
                    "Quantify pH without electrodes",
                    "Remove PCR inhibitors"
                ],
                "answerIndex": 0,
                "explanation": "SIP links activity to identity by tracking isotope incorporation into nucleic acids.",
                "tags": ["methods"],
                "publish": true
            }
        ]),
        View::Projects => json!([
            {
                "title": "Project title 1",
                "summary": "One-paragraph description: question, system, and what success looks like.",
                "funder": "Funding agency / program",
                "url": "https://REPLACE_ME",
                "publish": true
            },
            {
                "title": "Project title 2",
                "summary": "One-paragraph description: question, system, and what success looks like.",
                "funder": "Funding agency / program",
                "url": "",
                "publish": true
            }
        ]),
        View::Announcements => json!([
            {
                "title": "Recruiting",
                "text": "Short call-to-action with link to the intake form.",
                "url": "https://REPLACE_ME",
                "publish": true,
                "time": ""
            },
            {
                "title": "Latest paper / preprint",
                "text": "Link to DOI or preprint server.",
                "url": "https://REPLACE_ME",
                "publish": true,
                "time": ""
            },
            {
                "title": "Recent field campaign",
                "text": "Link to the gallery album.",
                "url": "https://REPLACE_ME",
                "publish": true,
                "time": ""
            }
        ]),
        View::Scholarly => json!([]),
        View::Gallery => json!([
            "https://photos.app.goo.gl/a34KLz7R6E1Hm1Hh7",
            "https://photos.app.goo.gl/ZrPXvHfVgmKRi14fA",
            "https://photos.app.goo.gl/iLu9ewFdFjVUaCyF9",
            "https://photos.app.goo.gl/D4MJDXNcSSgtXbXq6",
            "https://photos.app.goo.gl/FBhuLVfCpy5mQFSq6",
            "https://photos.app.goo.gl/qGbQeyKc7X9a6GRY8"
        ]),
    };

    match records {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

pub struct ResearchArea {
    pub title: &'static str,
    pub bullets: [&'static str; 3],
}

pub const RESEARCH_AREAS: [ResearchArea; 3] = [
    ResearchArea {
        title: "Rhizosphere nutrient acquisition",
        bullets: [
            "Microbial mediation of P and N cycling under managed ecosystems",
            "Trait-based links from genomes to field outcomes",
            "SIP-enabled assignment of function to taxa",
        ],
    },
    ResearchArea {
        title: "Microbiome engineering & experimentation",
        bullets: [
            "Design–build–test workflows for microbial communities",
            "Automation and reproducible protocols",
            "Greenhouse-to-field translation",
        ],
    },
    ResearchArea {
        title: "FAIR data + community standards",
        bullets: [
            "Controlled vocabularies and metadata for microbial ecology",
            "Open repositories, reusable workflows",
            "Education and training in data practices",
        ],
    },
];
