use crate::job::Metadata;
use crate::slide::{RoastEntry, RoastsData, SignatureEntry, SignatureWordsData, SlideKind, SlideRecord};
use crate::summary::{extract_summary, SummaryData};

/// Entries per roast or signature-word page.
pub const PAGE_SIZE: usize = 5;

/// A presentable unit derived from the slide records.
#[derive(Debug, Clone, PartialEq)]
pub enum VirtualSlide {
    Intro,
    Outro,
    Regular(SlideRecord),
    BrainRot(SlideRecord),
    IndividualRoasts {
        entries: Vec<RoastEntry>,
        page: usize,
    },
    SignatureWords {
        entries: Vec<SignatureEntry>,
        page: usize,
        total_pages: usize,
    },
    Summary(SummaryData),
}

/// Expands raw slides into the ordered deck the presentation walks through.
///
/// The deck opens with `Intro`, closes with `Summary` then `Outro`; `chat_graph`
/// records are dropped and per-person collections are split into pages of
/// [`PAGE_SIZE`].
pub fn expand_slides(slides: &[SlideRecord], metadata: Option<&Metadata>) -> Vec<VirtualSlide> {
    let mut deck = Vec::with_capacity(slides.len() + 3);
    deck.push(VirtualSlide::Intro);

    for slide in slides {
        match slide.kind() {
            SlideKind::ChatGraph => {}
            SlideKind::AiRoasts => {
                deck.push(VirtualSlide::BrainRot(slide.clone()));
                let roasts: RoastsData = slide.view();
                deck.extend(
                    roasts
                        .entries()
                        .chunks(PAGE_SIZE)
                        .enumerate()
                        .map(|(page, entries)| VirtualSlide::IndividualRoasts {
                            entries: entries.to_vec(),
                            page,
                        }),
                );
            }
            SlideKind::SignatureWords => {
                let words: SignatureWordsData = slide.view();
                let entries = words.entries();
                let total_pages = entries.len().div_ceil(PAGE_SIZE);
                deck.extend(entries.chunks(PAGE_SIZE).enumerate().map(|(page, entries)| {
                    VirtualSlide::SignatureWords {
                        entries: entries.to_vec(),
                        page,
                        total_pages,
                    }
                }));
            }
            SlideKind::Overview
            | SlideKind::Ranking
            | SlideKind::Emojis
            | SlideKind::Activity
            | SlideKind::Words
            | SlideKind::ConvoDynamics
            | SlideKind::FunStats
            | SlideKind::Other(_) => deck.push(VirtualSlide::Regular(slide.clone())),
        }
    }

    deck.push(VirtualSlide::Summary(extract_summary(slides, metadata)));
    deck.push(VirtualSlide::Outro);
    deck
}
