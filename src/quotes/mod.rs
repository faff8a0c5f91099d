pub mod rotator;

use serde_json::Value;

use crate::content::first_field;

pub const QUOTES_PER_SLIDE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteKind {
    Text,
    Image,
}

impl QuoteKind {
    fn as_str(&self) -> &'static str {
        match self {
            QuoteKind::Text => "text",
            QuoteKind::Image => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteItem {
    pub id: String,
    pub kind: QuoteKind,
    pub text: String,
    pub attribution: String,
    pub category: String,
    pub url: String,
}

/// Items with a url and no text are images (MEMEs); blank items are dropped.
pub fn normalize_quotes(records: &[Value]) -> Vec<QuoteItem> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let text = first_field(record, &["text"]);
            let url = first_field(record, &["url"]);
            let kind = if !url.is_empty() && text.is_empty() {
                QuoteKind::Image
            } else {
                QuoteKind::Text
            };
            let id = first_field(record, &["id"]);

            QuoteItem {
                id: if id.is_empty() {
                    format!("{}-{}", kind.as_str(), idx)
                } else {
                    id
                },
                kind,
                text,
                attribution: first_field(record, &["attribution"]),
                category: first_field(record, &["category"]),
                url,
            }
        })
        .filter(|item| !item.text.is_empty() || !item.url.is_empty())
        .collect()
}

/// One unit of rotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Slide {
    TextSet(Vec<QuoteItem>),
    Image(QuoteItem),
}

impl Slide {
    pub fn items(&self) -> &[QuoteItem] {
        match self {
            Slide::TextSet(items) => items,
            Slide::Image(item) => std::slice::from_ref(item),
        }
    }
}

/// Groups text quotes in threes. An image flushes whatever text is pending
/// and then stands alone.
pub fn build_slides(items: &[QuoteItem]) -> Vec<Slide> {
    let mut slides = Vec::new();
    let mut pending: Vec<QuoteItem> = Vec::new();

    for item in items {
        match item.kind {
            QuoteKind::Image => {
                if !pending.is_empty() {
                    slides.push(Slide::TextSet(std::mem::take(&mut pending)));
                }
                slides.push(Slide::Image(item.clone()));
            }
            QuoteKind::Text => {
                pending.push(item.clone());
                if pending.len() == QUOTES_PER_SLIDE {
                    slides.push(Slide::TextSet(std::mem::take(&mut pending)));
                }
            }
        }
    }

    if !pending.is_empty() {
        slides.push(Slide::TextSet(pending));
    }
    slides
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn text(id: usize) -> QuoteItem {
        QuoteItem {
            id: format!("t{}", id),
            kind: QuoteKind::Text,
            text: format!("quote {}", id),
            attribution: String::new(),
            category: String::new(),
            url: String::new(),
        }
    }

    fn image(id: usize) -> QuoteItem {
        QuoteItem {
            id: format!("i{}", id),
            kind: QuoteKind::Image,
            text: String::new(),
            attribution: String::new(),
            category: String::new(),
            url: format!("https://img/{}", id),
        }
    }

    /// Slide sizes, with images as 0 so they stand out.
    fn shape(slides: &[Slide]) -> Vec<usize> {
        slides
            .iter()
            .map(|slide| match slide {
                Slide::TextSet(items) => items.len(),
                Slide::Image(_) => 0,
            })
            .collect()
    }

    #[test]
    fn seven_texts_then_image() {
        let mut items: Vec<_> = (0..7).map(text).collect();
        items.push(image(7));

        assert_eq!(shape(&build_slides(&items)), vec![3, 3, 1, 0]);
    }

    #[test]
    fn image_mid_buffer_flushes_partial_set() {
        let items = vec![text(0), text(1), image(2), text(3), text(4), text(5), text(6)];
        assert_eq!(shape(&build_slides(&items)), vec![2, 0, 3, 1]);
    }

    #[test]
    fn consecutive_images_and_full_buffer_before_image() {
        let items = vec![text(0), text(1), text(2), image(3), image(4)];
        assert_eq!(shape(&build_slides(&items)), vec![3, 0, 0]);
    }

    #[test]
    fn trailing_pair_is_its_own_slide() {
        let items: Vec<_> = (0..5).map(text).collect();
        assert_eq!(shape(&build_slides(&items)), vec![3, 2]);
        assert!(build_slides(&[]).is_empty());
    }

    #[test]
    fn normalization_classifies_and_drops_blanks() {
        let items = normalize_quotes(&[
            json!({ "text": "  Data are a deliverable.  ", "attribution": "Lab" }),
            json!({ "url": "https://img/meme.png", "category": "meme" }),
            json!({ "text": "Captioned", "url": "https://img/c.png", "id": "cap" }),
            json!({ "attribution": "nobody" }),
        ]);

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].text, "Data are a deliverable.");
        assert_eq!(items[0].id, "text-0");
        assert_eq!(items[1].kind, QuoteKind::Image);
        assert_eq!(items[1].id, "image-1");
        assert_eq!(items[2].kind, QuoteKind::Text);
        assert_eq!(items[2].id, "cap");
    }

    proptest! {
        #[test]
        fn slides_are_lossless_and_bounded(kinds in proptest::collection::vec(any::<bool>(), 0..60)) {
            let items: Vec<QuoteItem> = kinds
                .iter()
                .enumerate()
                .map(|(i, is_image)| if *is_image { image(i) } else { text(i) })
                .collect();

            let slides = build_slides(&items);
            let flattened: Vec<QuoteItem> = slides.iter().flat_map(|s| s.items().to_vec()).collect();
            prop_assert_eq!(&flattened, &items);

            for slide in &slides {
                match slide {
                    Slide::TextSet(set) => {
                        prop_assert!((1..=QUOTES_PER_SLIDE).contains(&set.len()));
                        prop_assert!(set.iter().all(|item| item.kind == QuoteKind::Text));
                    }
                    Slide::Image(item) => prop_assert_eq!(item.kind, QuoteKind::Image),
                }
            }
        }
    }
}
