use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{KeyboardMarkup, MessageId, ParseMode};

use crate::quotes::rotator::{RotationTimer, Rotator};
use crate::quotes::Slide;
use crate::render;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A quote message that rotates in place for one chat.
struct Carousel {
    rotator: Arc<Mutex<Rotator>>,
    message_id: MessageId,
    // dropping this stops the rotation
    timer: Option<RotationTimer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Back,
    Forward,
}

/// Open quote carousels, one per chat.
pub struct QuoteBoard {
    slides: Arc<Vec<Slide>>,
    period: Duration,
    open: Mutex<HashMap<ChatId, Carousel>>,
}

impl QuoteBoard {
    pub fn new(slides: Vec<Slide>, period: Duration) -> Self {
        Self {
            slides: Arc::new(slides),
            period,
            open: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Sends the first slide and starts rotating it.
    pub async fn open(
        &self,
        bot: &Bot,
        chat_id: ChatId,
        keyboard: KeyboardMarkup,
    ) -> Result<(), teloxide::RequestError> {
        // the old timer stops here, its rotator is reused from the first slide
        let previous = lock(&self.open).remove(&chat_id).map(|carousel| carousel.rotator);

        let total = self.slides.len();
        let Some(first) = self.slides.first() else {
            bot.send_message(chat_id, "No quotes or MEMEs published yet.")
                .reply_markup(keyboard)
                .await?;
            return Ok(());
        };

        let sent = bot
            .send_message(chat_id, render::slide(first, 0, total))
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await?;

        let rotator = previous.unwrap_or_else(|| Arc::new(Mutex::new(Rotator::new(total))));
        {
            let mut rotator = lock(&rotator);
            rotator.reset(total);
            rotator.resume();
        }
        let timer = (total > 1).then(|| {
            let bot = bot.clone();
            let slides = self.slides.clone();
            let rotator = rotator.clone();
            let message_id = sent.id;
            RotationTimer::start(self.period, move || {
                let bot = bot.clone();
                let slides = slides.clone();
                let rotator = rotator.clone();
                async move {
                    let index = {
                        let mut rotator = lock(&rotator);
                        if !rotator.tick() {
                            return;
                        }
                        rotator.index()
                    };
                    show(&bot, chat_id, message_id, &slides, index).await;
                }
            })
        });

        lock(&self.open).insert(
            chat_id,
            Carousel {
                rotator,
                message_id: sent.id,
                timer,
            },
        );
        Ok(())
    }

    /// Returns `false` when this chat has no open carousel, e.g. after a restart.
    pub async fn step(&self, bot: &Bot, chat_id: ChatId, step: Step) -> bool {
        let shown = {
            let open = lock(&self.open);
            let shown = open.get(&chat_id).map(|carousel| {
                let mut rotator = lock(&carousel.rotator);
                let index = match step {
                    Step::Back => rotator.prev(),
                    Step::Forward => rotator.next(),
                };
                (carousel.message_id, index)
            });
            shown
        };

        let Some((message_id, index)) = shown else {
            return false;
        };
        show(bot, chat_id, message_id, &self.slides, index).await;
        true
    }

    /// Returns the new paused state, or `None` if nothing is rotating.
    pub fn toggle_pause(&self, chat_id: ChatId) -> Option<bool> {
        let open = lock(&self.open);
        let carousel = open.get(&chat_id)?;
        let mut rotator = lock(&carousel.rotator);
        if rotator.is_paused() {
            rotator.resume();
        } else {
            rotator.pause();
        }
        if let Some(timer) = &carousel.timer {
            if rotator.is_paused() {
                timer.pause();
            } else {
                timer.resume();
            }
        }
        Some(rotator.is_paused())
    }

    pub fn close(&self, chat_id: ChatId) {
        if lock(&self.open).remove(&chat_id).is_some() {
            log::debug!("Closed quote carousel for chat {}", chat_id.0);
        }
    }
}

async fn show(bot: &Bot, chat_id: ChatId, message_id: MessageId, slides: &[Slide], index: usize) {
    let Some(slide) = slides.get(index) else {
        return;
    };
    let edited = bot
        .edit_message_text(chat_id, message_id, render::slide(slide, index, slides.len()))
        .parse_mode(ParseMode::Html)
        .await;
    // the chat may have deleted the message; nothing to do about it
    if let Err(err) = edited {
        log::debug!("Could not update quote slide in chat {}: {}", chat_id.0, err);
    }
}
