//! HTML message bodies for every view the bot can show.

use teloxide::utils::html::escape;

use crate::content::fallback::RESEARCH_AREAS;
use crate::content::present::announcement_time;
use crate::content::{Announcement, GalleryPhoto, Member, Project, Publication};
use crate::quiz::{AttemptRecord, QuizAttempt, QuizQuestion};
use crate::quotes::Slide;

pub const LAB_NAME: &str = "Managed Ecosystem Microbial Ecology Lab";
const LAB_DEPT: &str = "Department of Agronomy, Purdue University";
const LAB_LOCATION: &str = "West Lafayette, Indiana";
const LAB_EMAIL: &str = "rcwilhelm@purdue.edu";
const PUBLICATIONS_URL: &str = "https://www.zotero.org/groups/meme-lab-website/library";
const DATA_REPO_URL: &str = "https://osf.io/6nepb/";
const PROTOCOLS_URL: &str = "https://www.protocols.io/workspaces/meme-lab-protocols/publications";
const PHOTO_ALBUM_URL: &str = "https://photos.app.goo.gl/ZR5tYz2Lnmk84bQx9";
const LAB_SAFETY_URL: &str = "https://www.purdue.edu/ehps/";

struct Resource {
    title: &'static str,
    desc: &'static str,
    url: &'static str,
}

/// Research resources, grouped by section. An empty url means not published yet.
const RESOURCES: &[(&str, &str, &[Resource])] = &[
    (
        "Lab Protocols",
        "Curated lab methods and SOPs, organized for reproducibility and reuse.",
        &[
            Resource {
                title: "Protocols.io",
                desc: "Versioned methods with DOIs",
                url: PROTOCOLS_URL,
            },
            Resource {
                title: "SIP Navigator",
                desc: "Custom GPT trained to guide SIP experiments",
                url: "https://chatgpt.com/g/g-EO0rQOq7r-sip-navigator-beta",
            },
        ],
    ),
    (
        "Databases and Code",
        "Databases, code, and analysis infrastructure maintained by the lab.",
        &[
            Resource {
                title: "SIPdb",
                desc: "Reverse ecology tool for attributing putative function",
                url: "http://sip-db.com/",
            },
            Resource {
                title: "autoSIP",
                desc: "Print and assembly instructions for gradient fractionating robot",
                url: "",
            },
        ],
    ),
    (
        "Data Handling",
        "Standards and guidance for FAIR data, metadata, and lab-to-archive workflows.",
        &[
            Resource {
                title: "Stan the AgData Advisor",
                desc: "Custom GPT trained to guide formatting and archiving data",
                url: "https://chatgpt.com/g/g-wK0NsSO0A-stan-the-agdata-advisor",
            },
            Resource {
                title: "STREAMS guideline",
                desc: "Recommended practices for host and environmental microbiome data",
                url: "https://www.nature.com/articles/s41564-025-02186-2",
            },
            Resource {
                title: "MISIP standard",
                desc: "Standard for archival of SIP nucleic acid data",
                url: "https://academic.oup.com/gigascience/article/doi/10.1093/gigascience/giae071/7817747",
            },
        ],
    ),
];

// Telegram rejects messages over 4096 characters
const MAX_MESSAGE_LEN: usize = 4000;

fn bold(text: &str) -> String {
    format!("<b>{}</b>", escape(text))
}

fn italic(text: &str) -> String {
    format!("<i>{}</i>", escape(text))
}

fn link(url: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", escape(url), escape(text))
}

fn title_or_link(title: &str, url: &str) -> String {
    if url.is_empty() {
        bold(title)
    } else {
        format!("<b>{}</b>", link(url, title))
    }
}

fn dash_if_empty(value: &str) -> &str {
    if value.is_empty() {
        "—"
    } else {
        value
    }
}

/// Splits on blank lines so no chunk exceeds the message limit.
pub fn split_message(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for block in text.split("\n\n") {
        if !current.is_empty() && current.len() + block.len() + 2 > MAX_MESSAGE_LEN {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(block);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

pub fn about() -> String {
    let mut out = vec![
        bold(LAB_NAME),
        format!("{}\n{} · {}", escape(LAB_DEPT), escape(LAB_LOCATION), escape(LAB_EMAIL)),
        escape(
            "The MEME Team studies how land management shapes microbial communities and how those \
             communities, in turn, regulate nutrient cycling, plant health, and ecosystem services.",
        ),
    ];
    for area in RESEARCH_AREAS.iter() {
        let bullets: Vec<String> = area.bullets.iter().map(|b| format!("• {}", escape(b))).collect();
        out.push(format!("{}\n{}", bold(area.title), bullets.join("\n")));
    }
    out.push(
        [
            link(PUBLICATIONS_URL, "Publications"),
            link(DATA_REPO_URL, "Data repository"),
            link(PROTOCOLS_URL, "Protocols"),
        ]
        .join(" · "),
    );
    out.join("\n\n")
}

pub fn research() -> String {
    let mut out = vec![bold("Research resources")];
    for (section, blurb, resources) in RESOURCES {
        let mut lines = vec![bold(section), italic(blurb)];
        for resource in resources.iter() {
            let name = if resource.url.is_empty() {
                format!("{} (coming soon)", escape(resource.title))
            } else {
                link(resource.url, resource.title)
            };
            lines.push(format!("• {}: {}", name, escape(resource.desc)));
        }
        out.push(lines.join("\n"));
    }
    out.push(link(LAB_SAFETY_URL, "Purdue University Lab Safety Resources"));
    out.join("\n\n")
}

/// The restricted hub needs a Google account; the bot only hands out the link.
pub fn member_portal(hub_url: Option<&str>) -> String {
    let header = format!("{}\n{}", bold("Member portal"), italic("Google account required"));
    let body = match hub_url {
        Some(url) => format!(
            "This links to account-restricted resources hosted in Google Drive.\n{}",
            link(url, "Open members hub")
        ),
        None => "The members hub link has not been set up yet.".to_string(),
    };
    format!("{}\n\n{}", header, body)
}

pub fn members(members: &[&Member]) -> String {
    if members.is_empty() {
        return "No members match that search.".to_string();
    }
    members
        .iter()
        .map(|member| {
            let mut lines = vec![bold(&member.name)];
            if !member.role.is_empty() {
                lines.push(italic(&member.role));
            }
            if !member.focus.is_empty() {
                lines.push(escape(&member.focus));
            }
            let links: Vec<String> = member.links.iter().map(|(name, url)| link(url, name)).collect();
            if !links.is_empty() {
                lines.push(links.join(" · "));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn projects(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects published yet.".to_string();
    }
    projects
        .iter()
        .map(|project| {
            let mut lines = vec![title_or_link(&project.title, &project.url)];
            if !project.summary.is_empty() {
                lines.push(escape(&project.summary));
            }
            let meta: Vec<&str> = [project.funder.as_str(), project.date.as_str()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect();
            if !meta.is_empty() {
                lines.push(italic(&meta.join(" · ")));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn publications(publications: &[Publication]) -> String {
    if publications.is_empty() {
        return "No recent items found yet.".to_string();
    }
    publications
        .iter()
        .map(|p| {
            format!(
                "{} • {}\n{}\n{}",
                escape(dash_if_empty(&p.first_author)),
                escape(dash_if_empty(&p.journal)),
                title_or_link(&p.title, &p.url),
                escape(dash_if_empty(&p.date)),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn announcements(announcements: &[Announcement]) -> String {
    if announcements.is_empty() {
        return "No announcements right now.".to_string();
    }
    announcements
        .iter()
        .map(|a| {
            let mut lines = vec![bold(&a.title)];
            if !a.text.is_empty() {
                lines.push(if a.url.is_empty() {
                    escape(&a.text)
                } else {
                    link(&a.url, &a.text)
                });
            }
            let when = announcement_time(&a.time);
            if !when.is_empty() {
                lines.push(italic(&when));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn gallery(photos: &[GalleryPhoto]) -> String {
    let mut lines = vec![bold("Gallery")];
    lines.extend(
        photos
            .iter()
            .enumerate()
            .map(|(i, photo)| link(&photo.url, &format!("Photo {}", i + 1))),
    );
    lines.push(link(PHOTO_ALBUM_URL, "Full album"));
    lines.join("\n")
}

pub fn slide(slide: &Slide, index: usize, total: usize) -> String {
    let body = match slide {
        Slide::TextSet(items) => items
            .iter()
            .map(|item| {
                let mut quote = format!("“{}”", escape(&item.text));
                if !item.attribution.is_empty() {
                    quote.push_str(&format!("\n— {}", italic(&item.attribution)));
                }
                quote
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        Slide::Image(item) => {
            let label = if item.category.is_empty() { "MEME" } else { item.category.as_str() };
            let mut image = link(&item.url, &format!("🖼 {}", label));
            if !item.attribution.is_empty() {
                image.push_str(&format!("\n— {}", italic(&item.attribution)));
            }
            image
        }
    };
    format!("{}\n\n{}/{}", body, index + 1, total)
}

pub fn choice_label(index: usize) -> String {
    char::from(b'A' + (index % 26) as u8).to_string()
}

pub fn parse_choice(text: &str) -> Option<usize> {
    let mut chars = text.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some((c.to_ascii_uppercase() as u8 - b'A') as usize),
        _ => None,
    }
}

pub fn question(question: &QuizQuestion, position: usize, total: usize) -> String {
    let choices: Vec<String> = question
        .choices
        .iter()
        .enumerate()
        .map(|(i, choice)| format!("{}) {}", choice_label(i), escape(choice)))
        .collect();
    format!(
        "{}\n\n{}\n\n{}",
        italic(&format!("Question {} / {}", position + 1, total)),
        bold(&question.question),
        choices.join("\n")
    )
}

pub fn reveal(record: &AttemptRecord) -> String {
    let mut out = if record.correct {
        "✅ Correct!".to_string()
    } else {
        let answer = record
            .choices
            .get(record.correct_index)
            .map(String::as_str)
            .unwrap_or_default();
        format!(
            "❌ Not quite. The answer is {}) {}",
            choice_label(record.correct_index),
            escape(answer)
        )
    };
    if !record.explanation.is_empty() {
        out.push_str("\n\n");
        out.push_str(&escape(&record.explanation));
    }
    out
}

pub fn summary(attempt: &QuizAttempt) -> String {
    let score = attempt.score();
    let mut out = vec![format!(
        "{}\nScore: {} / {} ({}%)\n{}",
        bold("Quiz complete"),
        score.correct,
        score.total,
        score.percent(),
        italic("Another quiz draws a new set of questions (no repeats this session).")
    )];

    for (i, record) in attempt.records().iter().enumerate() {
        let answer_text = |index: usize| {
            record
                .choices
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("Choice {}", index + 1))
        };
        let mut entry = format!(
            "{} {}. {}\nYour answer: {}\nCorrect answer: {}",
            if record.correct { "✅" } else { "❌" },
            i + 1,
            escape(&record.question),
            escape(&answer_text(record.picked_index)),
            escape(&answer_text(record.correct_index)),
        );
        if !record.explanation.is_empty() {
            entry.push('\n');
            entry.push_str(&italic(&record.explanation));
        }
        out.push(entry);
    }
    out.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::{QuoteItem, QuoteKind};

    fn question_fixture() -> QuizQuestion {
        QuizQuestion {
            id: Some("q1".into()),
            question: "Which is <larger>?".into(),
            choices: vec!["K⁺".into(), "NO₃⁻".into()],
            answer_index: 0,
            explanation: "Cations & anions".into(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn choices_are_lettered_and_escaped() {
        let text = question(&question_fixture(), 2, 10);
        assert!(text.contains("Question 3 / 10"));
        assert!(text.contains("Which is &lt;larger&gt;?"));
        assert!(text.contains("A) K⁺\nB) NO₃⁻"));
    }

    #[test]
    fn choice_letters_round_trip() {
        assert_eq!(choice_label(0), "A");
        assert_eq!(choice_label(3), "D");
        assert_eq!(parse_choice(" b "), Some(1));
        assert_eq!(parse_choice("D"), Some(3));
        assert_eq!(parse_choice("Next question"), None);
        assert_eq!(parse_choice(""), None);
    }

    #[test]
    fn summary_reports_score_and_review() {
        let bank = vec![question_fixture()];
        let mut attempt = QuizAttempt::new(vec![0]);
        attempt.pick(&bank, 1);
        attempt.advance();

        let text = summary(&attempt);
        assert!(text.contains("Score: 0 / 1 (0%)"));
        assert!(text.contains("Your answer: NO₃⁻"));
        assert!(text.contains("Correct answer: K⁺"));
        assert!(text.contains("Cations &amp; anions"));
    }

    #[test]
    fn wrong_pick_names_the_answer() {
        let bank = vec![question_fixture()];
        let mut attempt = QuizAttempt::new(vec![0]);
        let record = attempt.pick(&bank, 1).cloned().unwrap();
        assert!(reveal(&record).starts_with("❌ Not quite. The answer is A) K⁺"));
    }

    #[test]
    fn slides_show_position() {
        let item = QuoteItem {
            id: "i".into(),
            kind: QuoteKind::Image,
            text: String::new(),
            attribution: "Field crew".into(),
            category: String::new(),
            url: "https://img/1.png".into(),
        };
        let text = slide(&Slide::Image(item), 1, 4);
        assert!(text.contains("href=\"https://img/1.png\""));
        assert!(text.ends_with("2/4"));
    }

    #[test]
    fn long_text_is_split_on_blank_lines() {
        let block = "x".repeat(1500);
        let text = vec![block.clone(); 5].join("\n\n");
        let chunks = split_message(&text);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() <= MAX_MESSAGE_LEN));
        assert_eq!(chunks.join("\n\n"), text);
    }

    #[test]
    fn research_lists_every_resource() {
        let text = research();
        for name in ["SIP Navigator", "SIPdb", "Stan the AgData Advisor", "STREAMS guideline", "MISIP standard"] {
            assert!(text.contains(&format!(">{}</a>", name)), "missing {}", name);
        }
        assert!(text.contains("autoSIP (coming soon)"));
        assert!(text.contains("href=\"https://www.purdue.edu/ehps/\""));
    }

    #[test]
    fn member_portal_links_hub_when_set() {
        let text = member_portal(Some("https://drive.example/hub"));
        assert!(text.contains("href=\"https://drive.example/hub\""));
        assert!(text.contains("Google account required"));

        assert!(member_portal(None).contains("has not been set up yet"));
    }

    #[test]
    fn empty_sections_have_placeholders() {
        assert_eq!(publications(&[]), "No recent items found yet.");
        assert_eq!(members(&[]), "No members match that search.");
    }
}
