//! Extractor for the transitional dialect.
//!
//! These files predate the ELI markup: `doc-ti` headers carry the title and
//! annex boundaries, `ti-art` headers open articles, recitals sit in small
//! two-cell tables, and everything is flat siblings. `sti-art` contains
//! `ti-art` as a substring, so article headers are matched as a whole class
//! word while the end-of-article check deliberately keeps the looser
//! substring test.

use super::{collect_references, ExtractStrategy};
use crate::error::Result;
use crate::markup::Element;
use crate::types::{ActDocument, Annex, Article, Recital};

pub struct TransitionalStrategy;

impl ExtractStrategy for TransitionalStrategy {
    fn extract(&self, root: &Element, doc: &mut ActDocument) -> Result<()> {
        extract_title(root, doc);

        if let Some((siblings, first)) = first_article_scope(root) {
            extract_preamble(&siblings[..first], doc);
        }

        extract_articles(root, doc);
        extract_final_provisions(root, doc);
        extract_annexes(root, doc);
        Ok(())
    }
}

fn has_class_word(e: &Element, word: &str) -> bool {
    e.class().split_whitespace().any(|c| c == word)
}

fn is_article_header(e: &Element) -> bool {
    has_class_word(e, "ti-art")
}

fn is_annex_header(e: &Element) -> bool {
    e.has_class_containing("doc-ti") && e.clean_text().to_uppercase().contains("BILAGA")
}

/// Sibling list holding the document-order first article header, plus the
/// header's index in it. The preamble is everything before that header.
fn first_article_scope(parent: &Element) -> Option<(&[Element], usize)> {
    for (idx, child) in parent.children.iter().enumerate() {
        if is_article_header(child) {
            return Some((&parent.children, idx));
        }
        if let Some(found) = first_article_scope(child) {
            return Some(found);
        }
    }
    None
}

fn extract_title(root: &Element, doc: &mut ActDocument) {
    let titles: Vec<String> = root
        .descendants()
        .filter(|e| e.has_class_containing("doc-ti"))
        .map(Element::clean_text)
        .filter(|t| !t.to_uppercase().contains("BILAGA"))
        .collect();
    if !titles.is_empty() {
        doc.metadata.title = titles.join(" ");
    }
}

/// Everything before the first article header is preamble: recitals live in
/// two-cell tables (number, text), loose paragraphs join the intro.
fn extract_preamble(preceding: &[Element], doc: &mut ActDocument) {
    let mut intro_parts: Vec<String> = Vec::new();

    for node in preceding {
        if node.has_class_containing("doc-ti") {
            continue;
        }

        if node.tag == "table" {
            let cells: Vec<&Element> = node
                .find_descendant(|e| e.tag == "tr")
                .map(|tr| tr.descendants().filter(|e| e.tag == "td").collect())
                .unwrap_or_default();

            if cells.len() >= 2 {
                let raw_num = cells[0].clean_text();
                // Footnote tables reuse the same shape; their first cell
                // holds a dotted or long marker instead of a recital number.
                if raw_num.contains('.') || raw_num.chars().count() > 5 {
                    continue;
                }
                doc.preamble.recitals.push(Recital {
                    id: raw_num.trim_matches(['(', ')', ' ', '.']).to_string(),
                    text: cells[1].clean_text(),
                    references: collect_references(cells[1]),
                });
            } else {
                let text = node.clean_text();
                if !text.is_empty() {
                    intro_parts.push(text);
                }
            }
            continue;
        }

        if node.tag == "p" && node.has_class_containing("normal") {
            let text = node.clean_text();
            if !text.is_empty() {
                intro_parts.push(text);
            }
        }
    }

    doc.preamble.intro_text = intro_parts.join(" ");
}

fn ends_article(e: &Element) -> bool {
    let classes = e.class();
    (classes.contains("ti-art") && !classes.contains("sti-art"))
        || (e.tag == "div" && classes.contains("final"))
        || is_annex_header(e)
}

/// Article headers are collected document-wide; each header's content is
/// scanned from its own sibling list, so articles split across several
/// container divs are all picked up.
fn extract_articles(parent: &Element, doc: &mut ActDocument) {
    for (idx, child) in parent.children.iter().enumerate() {
        if is_article_header(child) {
            doc.body.push(scan_article(child, &parent.children[idx + 1..]));
        }
        extract_articles(child, doc);
    }
}

fn scan_article(header: &Element, following: &[Element]) -> Article {
    let mut article = Article::new(super::article_id_from_header(&header.clean_text()));

    for sibling in following {
        if ends_article(sibling) {
            break;
        }
        if sibling.has_class_containing("sti-art") {
            let title = sibling.clean_text();
            if !title.is_empty() {
                article.title = Some(title);
            }
        } else {
            let chunk = sibling.clean_text();
            if !chunk.is_empty() {
                article.content.push(chunk);
            }
            article.references.extend(collect_references(sibling));
        }
    }

    article
}

fn extract_annexes(parent: &Element, doc: &mut ActDocument) {
    for (idx, child) in parent.children.iter().enumerate() {
        if is_annex_header(child) {
            doc.annexes
                .push(scan_annex(child, &parent.children[idx + 1..]));
        }
        extract_annexes(child, doc);
    }
}

fn scan_annex(header: &Element, following: &[Element]) -> Annex {
    let header_text = header.clean_text();
    let anx_id = header_text
        .splitn(2, char::is_whitespace)
        .nth(1)
        .map_or_else(|| header_text.clone(), |rest| rest.trim().to_string());
    let mut annex = Annex::new(anx_id);

    for sibling in following {
        if is_annex_header(sibling) {
            break;
        }
        if sibling.has_class_containing("doc-ti") {
            annex.title = sibling.clean_text();
        } else {
            let chunk = sibling.clean_text();
            if !chunk.is_empty() {
                annex.content.push(chunk);
            }
            annex.references.extend(collect_references(sibling));
        }
    }

    annex
}

fn extract_final_provisions(root: &Element, doc: &mut ActDocument) {
    let Some(final_div) =
        root.find_descendant(|e| e.tag == "div" && e.class().contains("final"))
    else {
        return;
    };

    let text: Vec<String> = final_div
        .children
        .iter()
        .filter(|e| !e.has_class_containing("signatory"))
        .map(Element::clean_text)
        .filter(|t| !t.is_empty())
        .collect();
    if !text.is_empty() {
        doc.final_provisions.text = Some(text.join(" "));
    }

    let signatures: Vec<String> = final_div
        .descendants()
        .filter(|e| e.has_class_containing("signatory"))
        .map(Element::clean_text)
        .filter(|t| !t.is_empty())
        .collect();
    if !signatures.is_empty() {
        doc.final_provisions.signatures = Some(signatures);
    }
}
