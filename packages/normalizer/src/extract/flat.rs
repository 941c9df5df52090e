//! Extractor for the flat consolidated dialect.
//!
//! No ELI nesting: article and annex headers are flat siblings of their
//! content. Segmentation is a linear forward scan over sibling nodes. A new
//! article or annex begins exactly at a boundary header and accumulates the
//! following siblings until the next boundary.

use super::{collect_references, split_preamble, ExtractStrategy};
use crate::error::{NormalizerError, Result};
use crate::markup::Element;
use crate::types::{ActDocument, Annex, Article};

pub struct FlatStrategy;

impl ExtractStrategy for FlatStrategy {
    fn extract(&self, root: &Element, doc: &mut ActDocument) -> Result<()> {
        let titles: Vec<String> = root
            .descendants()
            .filter(|e| e.has_class_containing("title-doc-first"))
            .map(Element::clean_text)
            .collect();
        if !titles.is_empty() {
            doc.metadata.title = titles.join(" ");
        }

        if let Some(preamble_div) = root.find_descendant(|e| e.tag == "div" && e.class() == "preamble")
        {
            split_preamble(preamble_div, &mut doc.preamble);
        }

        // Classification guarantees at least one boundary header.
        let Some(container) = find_boundary_container(root) else {
            return Err(NormalizerError::Extraction {
                celex: doc.metadata.celex.clone(),
                detail: "no article boundary container".to_string(),
            });
        };
        scan_siblings(&container.children, doc);

        Ok(())
    }
}

fn is_boundary(e: &Element) -> bool {
    e.has_class_containing("title-article-norm") || e.has_class_containing("title-annex-1")
}

/// First element (document order) that has a boundary header among its
/// direct children; the scan runs over that sibling list.
fn find_boundary_container(root: &Element) -> Option<&Element> {
    root.iter().find(|e| e.children.iter().any(is_boundary))
}

fn scan_siblings(siblings: &[Element], doc: &mut ActDocument) {
    let Some(start) = siblings.iter().position(is_boundary) else {
        return;
    };

    let mut idx = start;
    while idx < siblings.len() {
        let node = &siblings[idx];
        let classes = node.class();
        let text = node.clean_text();

        if classes.contains("title-article-norm") {
            let mut article = Article::new(super::article_id_from_header(&text));

            let mut scan = idx + 1;
            if let Some(next) = siblings.get(scan) {
                if next.has_class_containing("stitle-article-norm") {
                    article.title = Some(next.clean_text());
                    scan += 1;
                }
            }

            while let Some(sibling) = siblings.get(scan) {
                if is_boundary(sibling) {
                    break;
                }
                // Amendment markers from the consolidation process
                if sibling.has_class_containing("modref")
                    || sibling.has_class_containing("arrow")
                {
                    scan += 1;
                    continue;
                }
                let chunk = sibling.clean_text();
                if !chunk.is_empty() {
                    article.content.push(chunk);
                }
                article.references.extend(collect_references(sibling));
                scan += 1;
            }

            doc.body.push(article);
            idx = scan;
            continue;
        }

        if classes.contains("title-annex-1") {
            let mut annex = Annex::new(text.replace("BILAGA ", "").trim());

            let mut scan = idx + 1;
            while let Some(sibling) = siblings.get(scan) {
                if is_boundary(sibling) {
                    break;
                }
                if sibling.has_class_containing("title-annex-2") {
                    let sub = sibling.clean_text();
                    if annex.title.is_empty() {
                        annex.title = sub;
                    } else {
                        annex.content.push(sub);
                    }
                } else {
                    let chunk = sibling.clean_text();
                    if !chunk.is_empty() {
                        annex.content.push(chunk);
                    }
                    annex.references.extend(collect_references(sibling));
                }
                scan += 1;
            }

            doc.annexes.push(annex);
            idx = scan;
            continue;
        }

        idx += 1;
    }
}
