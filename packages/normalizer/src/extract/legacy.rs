//! Extractor for the legacy dialect.
//!
//! Legacy files are one undifferentiated text container. There are no
//! structural classes to key on, so segmentation is a state machine driven
//! entirely by the boilerplate phrases every act repeats: the preamble
//! opener, the "whereas" split, article and annex headings, and the closing
//! signature block.

use super::{
    collect_references, ExtractStrategy, ANNEX_START, ART_START, BODY_TRIGGER, FINAL_START,
    INTRO_START, RECITAL_SPLIT,
};
use crate::error::{NormalizerError, Result};
use crate::markup::Element;
use crate::types::{ActDocument, Annex, Article, Recital};

pub struct LegacyStrategy;

impl ExtractStrategy for LegacyStrategy {
    fn extract(&self, root: &Element, doc: &mut ActDocument) -> Result<()> {
        extract_meta(root, doc);

        // Classification guarantees the container; a tree without one
        // reached the wrong strategy.
        let Some(container) = find_text_container(root) else {
            return Err(NormalizerError::Extraction {
                celex: doc.metadata.celex.clone(),
                detail: "no text container".to_string(),
            });
        };

        let mut fsm = LegacyScan::new();
        for el in container
            .descendants()
            .filter(|e| matches!(e.tag.as_str(), "p" | "table" | "div"))
        {
            let Some(text) = block_text(el) else {
                continue;
            };
            fsm.step(el, &text, doc);
        }
        fsm.finish(doc);

        Ok(())
    }
}

/// Title and publication date come from Dublin Core meta headers when the
/// body itself carries no headline.
fn extract_meta(root: &Element, doc: &mut ActDocument) {
    let meta_content = |name: &str| -> Option<String> {
        root.iter()
            .find(|e| e.tag == "meta" && e.attr("name") == Some(name))
            .and_then(|e| e.attr("content"))
            .map(str::to_string)
    };

    if let Some(title) = meta_content("DC.description").or_else(|| meta_content("DC.title")) {
        doc.metadata.title = title;
    }
    if let Some(date) = meta_content("DC.date.published") {
        doc.metadata.date_published = date;
    }
}

fn find_text_container(root: &Element) -> Option<&Element> {
    root.find_descendant(|e| e.tag == "txt_te")
        .or_else(|| root.find_descendant(|e| e.id() == "TexteOnly"))
}

/// Text of one block element. Containers with nested blocks contribute only
/// their direct text so nested paragraphs are not emitted twice.
fn block_text(el: &Element) -> Option<String> {
    let has_nested_blocks = el
        .descendants()
        .any(|d| matches!(d.tag.as_str(), "p" | "table" | "div"));

    let text = if has_nested_blocks {
        let direct = el.text.as_deref().map(str::trim).unwrap_or("");
        if direct.chars().count() <= 1 {
            return None;
        }
        el.clean_direct_text()
    } else {
        el.clean_text()
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    PreambleWait,
    PreambleIntro,
    PreambleRecitals,
    BodyWait,
    Body,
    Annex,
    Final,
}

impl State {
    fn in_preamble(self) -> bool {
        matches!(
            self,
            Self::PreambleWait | Self::PreambleIntro | Self::PreambleRecitals
        )
    }
}

struct LegacyScan {
    state: State,
    current_article: Option<Article>,
    current_annex: Option<Annex>,
    recital_count: usize,
}

impl LegacyScan {
    fn new() -> Self {
        Self {
            state: State::PreambleWait,
            current_article: None,
            current_annex: None,
            recital_count: 1,
        }
    }

    fn step(&mut self, el: &Element, text: &str, doc: &mut ActDocument) {
        if BODY_TRIGGER.is_match(text)
            && !matches!(self.state, State::Body | State::BodyWait | State::Final)
        {
            self.state = State::BodyWait;
            return;
        }

        if self.state.in_preamble() {
            if let Some(caps) = ART_START.captures(text) {
                // Some acts skip the enacting formula entirely.
                self.state = State::Body;
                let mut article = Article::new(&caps[1]);
                let remainder = text[caps.get(0).map_or(0, |m| m.end())..].trim();
                if !remainder.is_empty() {
                    article.content.push(remainder.to_string());
                    article.references.extend(collect_references(el));
                }
                self.current_article = Some(article);
                return;
            }
        }

        if text.chars().count() < 50 {
            if let Some(caps) = ANNEX_START.captures(text) {
                self.close_article(doc);
                self.close_annex(doc);
                let id = caps.get(2).map_or_else(
                    || (doc.annexes.len() + 1).to_string(),
                    |m| m.as_str().to_string(),
                );
                let mut annex = Annex::new(id);
                let remainder = text[caps.get(0).map_or(0, |m| m.end())..].trim();
                if !remainder.is_empty() {
                    annex.title = remainder.to_string();
                }
                self.current_annex = Some(annex);
                self.state = State::Annex;
                return;
            }
        }

        if matches!(self.state, State::Body | State::BodyWait) && FINAL_START.is_match(text) {
            self.close_article(doc);
            self.state = State::Final;
            doc.final_provisions.append_text(text);
            return;
        }

        match self.state {
            State::PreambleWait => {
                if INTRO_START.is_match(text)
                    || text.to_lowercase().contains("med beaktande av")
                {
                    self.state = State::PreambleIntro;
                    doc.preamble.intro_text = text.to_string();
                }
            }
            State::PreambleIntro => {
                if !doc.preamble.intro_text.is_empty() {
                    doc.preamble.intro_text.push(' ');
                }
                doc.preamble.intro_text.push_str(text);
                if RECITAL_SPLIT.is_match(text) {
                    self.state = State::PreambleRecitals;
                }
            }
            State::PreambleRecitals => {
                doc.preamble.recitals.push(Recital {
                    id: self.recital_count.to_string(),
                    text: text.to_string(),
                    references: collect_references(el),
                });
                self.recital_count += 1;
            }
            State::Body | State::BodyWait => {
                if let Some(caps) = ART_START.captures(text) {
                    self.close_article(doc);
                    self.state = State::Body;
                    let mut article = Article::new(&caps[1]);
                    let remainder = text[caps.get(0).map_or(0, |m| m.end())..].trim();
                    if !remainder.is_empty() {
                        article.content.push(remainder.to_string());
                        article.references.extend(collect_references(el));
                    }
                    self.current_article = Some(article);
                } else if self.state == State::Body {
                    if let Some(article) = self.current_article.as_mut() {
                        article.content.push(text.to_string());
                        article.references.extend(collect_references(el));
                    }
                }
            }
            State::Final => {
                if text.chars().count() < 60 {
                    doc.final_provisions.push_signature(text);
                } else {
                    doc.final_provisions.append_text(text);
                }
            }
            State::Annex => {
                if let Some(annex) = self.current_annex.as_mut() {
                    if annex.title.is_empty() && annex.content.is_empty() {
                        annex.title = text.to_string();
                    } else {
                        annex.content.push(text.to_string());
                        annex.references.extend(collect_references(el));
                    }
                }
            }
        }
    }

    fn close_article(&mut self, doc: &mut ActDocument) {
        if let Some(article) = self.current_article.take() {
            doc.body.push(article);
        }
    }

    fn close_annex(&mut self, doc: &mut ActDocument) {
        if let Some(annex) = self.current_annex.take() {
            doc.annexes.push(annex);
        }
    }

    fn finish(&mut self, doc: &mut ActDocument) {
        self.close_article(doc);
        self.close_annex(doc);
    }
}
