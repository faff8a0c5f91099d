use std::sync::Arc;

use teloxide::{
    dispatching::dialogue::ErasedStorage,
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, ParseMode},
};

use crate::carousel::{QuoteBoard, Step};
use crate::config::Config;
use crate::content::{present, LabContent};
use crate::quiz::attempt_log::AttemptLogger;
use crate::quiz::session::QuizSessions;
use crate::quiz::{Phase, QuizAttempt};
use crate::render;

pub type LabDialogue = Dialogue<State, ErasedStorage<State>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    Menu,
    MemberSearch,
    Quotes,
    Quiz {
        attempt: QuizAttempt,
    },
}

const ABOUT: &str = "🔬 About";
const MEMBERS: &str = "👥 Members";
const PROJECTS: &str = "🗂 Projects";
const PUBLICATIONS: &str = "📚 Publications";
const ANNOUNCEMENTS: &str = "📣 Announcements";
const GALLERY: &str = "🖼 Gallery";
const QUOTES: &str = "💬 Quotes";
const QUIZ: &str = "🧫 Quiz";
const RESEARCH: &str = "🧪 Research";
const PORTAL: &str = "🔐 Member portal";

const BACK: &str = "⬅️ Menu";
const PREV_SLIDE: &str = "◀";
const NEXT_SLIDE: &str = "▶";
const PAUSE: &str = "⏯ Pause / resume";
const NEXT_QUESTION: &str = "Next question";
const FINISH: &str = "Finish";
const ANOTHER_QUIZ: &str = "Take another quiz";
const RESET_SESSION: &str = "Reset session";

const GREETING_TEXT: &str = "Hi! This is the MEME Lab bot. Browse the lab, meet the members, \
     or test your microbial ecology knowledge with a micro-quiz.";

fn keyboard(rows: &[&[&str]]) -> KeyboardMarkup {
    KeyboardMarkup::new(
        rows.iter()
            .map(|row| row.iter().map(|label| KeyboardButton::new(*label)).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    )
}

fn main_menu() -> KeyboardMarkup {
    keyboard(&[
        &[ABOUT, MEMBERS],
        &[PROJECTS, PUBLICATIONS],
        &[ANNOUNCEMENTS, GALLERY],
        &[QUOTES, QUIZ],
        &[RESEARCH, PORTAL],
    ])
}

fn quotes_keyboard() -> KeyboardMarkup {
    keyboard(&[&[PREV_SLIDE, NEXT_SLIDE], &[PAUSE], &[BACK]])
}

async fn open_quotes(bot: &Bot, dialogue: &LabDialogue, chat_id: ChatId, board: &QuoteBoard) -> HandlerResult {
    board.open(bot, chat_id, quotes_keyboard()).await?;
    if board.is_empty() {
        dialogue.update(State::Menu).await?;
    } else {
        dialogue.update(State::Quotes).await?;
    }
    Ok(())
}

fn is_back(text: &str) -> bool {
    text == BACK || text == "/menu" || text == "/start"
}

async fn send_html(bot: &Bot, chat_id: ChatId, text: &str, markup: KeyboardMarkup) -> HandlerResult {
    for chunk in render::split_message(text) {
        bot.send_message(chat_id, chunk)
            .parse_mode(ParseMode::Html)
            .reply_markup(markup.clone())
            .await?;
    }
    Ok(())
}

async fn show_menu(bot: &Bot, dialogue: &LabDialogue, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, "What would you like to see?")
        .reply_markup(main_menu())
        .await?;
    dialogue.update(State::Menu).await?;
    Ok(())
}

pub async fn start(bot: Bot, dialogue: LabDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;
    show_menu(&bot, &dialogue, msg.chat.id).await
}

pub async fn menu(
    bot: Bot,
    dialogue: LabDialogue,
    msg: Message,
    config: Arc<Config>,
    content: Arc<LabContent>,
    board: Arc<QuoteBoard>,
    sessions: QuizSessions,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    match msg.text() {
        Some(ABOUT) => send_html(&bot, chat_id, &render::about(), main_menu()).await?,
        Some(RESEARCH) => send_html(&bot, chat_id, &render::research(), main_menu()).await?,
        Some(PORTAL) => {
            let text = render::member_portal(config.members_hub_url.as_deref());
            send_html(&bot, chat_id, &text, main_menu()).await?
        }
        Some(MEMBERS) => {
            let everyone = present::filter_members(&content.members, "");
            send_html(&bot, chat_id, &render::members(&everyone), keyboard(&[&[BACK]])).await?;
            bot.send_message(chat_id, "Type a name, role or research topic to search the directory.")
                .await?;
            dialogue.update(State::MemberSearch).await?;
        }
        Some(PROJECTS) => send_html(&bot, chat_id, &render::projects(&content.projects), main_menu()).await?,
        Some(PUBLICATIONS) => {
            send_html(&bot, chat_id, &render::publications(&content.publications), main_menu()).await?
        }
        Some(ANNOUNCEMENTS) => {
            send_html(&bot, chat_id, &render::announcements(&content.announcements), main_menu()).await?
        }
        Some(GALLERY) => {
            let sample = present::sample_gallery(&content.gallery);
            send_html(&bot, chat_id, &render::gallery(&sample), main_menu()).await?
        }
        Some(QUOTES) => open_quotes(&bot, &dialogue, chat_id, &board).await?,
        Some(QUIZ) => start_quiz(&bot, &dialogue, chat_id, &content, &sessions).await?,
        _ => {
            bot.send_message(chat_id, "Please pick one of the options below.")
                .reply_markup(main_menu())
                .await?;
        }
    }
    Ok(())
}

pub async fn member_search(
    bot: Bot,
    dialogue: LabDialogue,
    msg: Message,
    content: Arc<LabContent>,
) -> HandlerResult {
    let Some(query) = msg.text() else {
        bot.send_message(msg.chat.id, "Please send the search as text.").await?;
        return Ok(());
    };
    if is_back(query) {
        return show_menu(&bot, &dialogue, msg.chat.id).await;
    }

    let found = present::filter_members(&content.members, query);
    log::debug!("Member search '{}' matched {}", query, found.len());
    send_html(&bot, msg.chat.id, &render::members(&found), keyboard(&[&[BACK]])).await
}

pub async fn quotes(
    bot: Bot,
    dialogue: LabDialogue,
    msg: Message,
    board: Arc<QuoteBoard>,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    match msg.text() {
        Some(text @ (PREV_SLIDE | NEXT_SLIDE)) => {
            let step = if text == PREV_SLIDE { Step::Back } else { Step::Forward };
            if !board.step(&bot, chat_id, step).await {
                open_quotes(&bot, &dialogue, chat_id, &board).await?;
            }
        }
        Some(PAUSE) => match board.toggle_pause(chat_id) {
            Some(paused) => {
                let reply = if paused { "Paused." } else { "Rotating again." };
                bot.send_message(chat_id, reply).await?;
            }
            None => open_quotes(&bot, &dialogue, chat_id, &board).await?,
        },
        Some(text) if is_back(text) => {
            board.close(chat_id);
            return show_menu(&bot, &dialogue, chat_id).await;
        }
        _ => {
            bot.send_message(chat_id, "Use ◀ / ▶ to browse, or go back to the menu.")
                .await?;
        }
    }
    Ok(())
}

async fn start_quiz(
    bot: &Bot,
    dialogue: &LabDialogue,
    chat_id: ChatId,
    content: &LabContent,
    sessions: &QuizSessions,
) -> HandlerResult {
    let Some(attempt) = sessions.start_attempt(&chat_id.0.to_string(), &content.quiz_bank) else {
        bot.send_message(chat_id, "The quiz is loading or unavailable right now.")
            .reply_markup(main_menu())
            .await?;
        dialogue.update(State::Menu).await?;
        return Ok(());
    };

    send_question(bot, chat_id, &attempt, content).await?;
    dialogue.update(State::Quiz { attempt }).await?;
    Ok(())
}

async fn send_question(
    bot: &Bot,
    chat_id: ChatId,
    attempt: &QuizAttempt,
    content: &LabContent,
) -> HandlerResult {
    let Some(question) = attempt.current(&content.quiz_bank) else {
        return Ok(());
    };
    let letters: Vec<String> = (0..question.choices.len()).map(render::choice_label).collect();
    let letters: Vec<&str> = letters.iter().map(String::as_str).collect();

    send_html(
        bot,
        chat_id,
        &render::question(question, attempt.position(), attempt.deck().len()),
        keyboard(&[letters.as_slice(), &[BACK]]),
    )
    .await
}

pub async fn quiz(
    bot: Bot,
    dialogue: LabDialogue,
    attempt: QuizAttempt,
    msg: Message,
    content: Arc<LabContent>,
    sessions: QuizSessions,
    logger: AttemptLogger,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    let Some(text) = msg.text() else {
        bot.send_message(chat_id, "Please answer with one of the buttons.").await?;
        return Ok(());
    };
    if is_back(text) {
        return show_menu(&bot, &dialogue, chat_id).await;
    }

    let bank = &content.quiz_bank;
    if attempt.is_stale(bank) {
        log::info!("Quiz attempt in chat {} no longer matches the bank, restarting", chat_id.0);
        bot.send_message(chat_id, "The quiz questions changed, so here is a fresh quiz.")
            .await?;
        return start_quiz(&bot, &dialogue, chat_id, &content, &sessions).await;
    }
    let mut attempt = attempt;
    match attempt.phase().clone() {
        Phase::Presenting => {
            let picked = render::parse_choice(text).and_then(|choice| attempt.pick(bank, choice).cloned());
            let Some(record) = picked else {
                bot.send_message(chat_id, "Pick one of the lettered answers.").await?;
                return Ok(());
            };

            // fire and forget
            let question_id = attempt.current(bank).and_then(|q| q.id.clone());
            logger.log(question_id.as_deref(), record.correct);

            let next = if attempt.is_last() { FINISH } else { NEXT_QUESTION };
            send_html(&bot, chat_id, &render::reveal(&record), keyboard(&[&[next], &[BACK]])).await?;
            dialogue.update(State::Quiz { attempt }).await?;
        }
        Phase::Revealed { .. } => {
            if text != NEXT_QUESTION && text != FINISH {
                bot.send_message(chat_id, "Tap the button below to continue.").await?;
                return Ok(());
            }
            attempt.advance();
            if attempt.is_finished() {
                send_html(
                    &bot,
                    chat_id,
                    &render::summary(&attempt),
                    keyboard(&[&[ANOTHER_QUIZ, RESET_SESSION], &[BACK]]),
                )
                .await?;
            } else {
                send_question(&bot, chat_id, &attempt, &content).await?;
            }
            dialogue.update(State::Quiz { attempt }).await?;
        }
        Phase::Finished => match text {
            ANOTHER_QUIZ => start_quiz(&bot, &dialogue, chat_id, &content, &sessions).await?,
            RESET_SESSION => {
                sessions.reset_session(&chat_id.0.to_string());
                start_quiz(&bot, &dialogue, chat_id, &content, &sessions).await?;
            }
            _ => {
                bot.send_message(chat_id, "Take another quiz, reset the session, or go back to the menu.")
                    .await?;
            }
        },
    }
    Ok(())
}
