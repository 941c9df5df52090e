//! Extractor for the modern ELI dialects.
//!
//! ELI documents are already segmented: every preamble, recital, article,
//! annex, and final-provisions block is a distinct subtree addressed by a
//! stable id prefix (`pbl_`, `rct_`, `art_`, `anx_`, `fnp_`). Extraction is
//! a direct projection, no sequential scan needed.

use super::{collect_references, ExtractStrategy};
use crate::error::Result;
use crate::markup::Element;
use crate::types::{ActDocument, Annex, Article, Recital};

pub struct EliStrategy;

impl ExtractStrategy for EliStrategy {
    fn extract(&self, root: &Element, doc: &mut ActDocument) -> Result<()> {
        extract_title(root, doc);
        extract_preamble(root, doc);
        extract_articles(root, doc);
        extract_annexes(root, doc);
        extract_final_provisions(root, doc);
        Ok(())
    }
}

fn extract_title(root: &Element, doc: &mut ActDocument) {
    let titles: Vec<String> = root
        .descendants()
        .filter(|e| {
            e.has_class_containing("oj-doc-ti") || e.has_class_containing("title-doc-first")
        })
        .map(Element::clean_text)
        .collect();
    if !titles.is_empty() {
        doc.metadata.title = titles.join(" ");
    }
}

fn extract_preamble(root: &Element, doc: &mut ActDocument) {
    if let Some(pbl) = root.find_descendant(|e| e.id_starts_with("pbl_")) {
        let mut intro_lines: Vec<String> = Vec::new();
        collect_intro_paragraphs(pbl, &mut intro_lines);
        doc.preamble.intro_text = intro_lines.join(" ");
    }

    for rct in root.descendants().filter(|e| e.id_starts_with("rct_")) {
        let cells: Vec<&Element> = rct.descendants().filter(|e| e.tag == "td").collect();
        let number = cells
            .first()
            .map(|c| c.clean_text().trim_matches(['(', ')', ' ', '.']).to_string())
            .unwrap_or_default();
        let text = cells
            .get(1)
            .map(|c| c.clean_text())
            .unwrap_or_else(|| rct.clean_text());
        doc.preamble.recitals.push(Recital {
            id: number,
            text,
            references: collect_references(rct),
        });
    }
}

/// Intro paragraphs are the `oj-normal` paragraphs of the preamble block
/// that do not sit inside a recital subtree.
fn collect_intro_paragraphs(node: &Element, out: &mut Vec<String>) {
    for child in &node.children {
        if child.id_starts_with("rct_") {
            continue;
        }
        if child.tag == "p" && child.has_class_containing("oj-normal") {
            out.push(child.clean_text());
        } else {
            collect_intro_paragraphs(child, out);
        }
    }
}

fn extract_articles(root: &Element, doc: &mut ActDocument) {
    for art in root.descendants().filter(|e| {
        e.tag == "div" && e.id_starts_with("art_") && e.has_class_containing("eli-subdivision")
    }) {
        let art_id = art
            .find_descendant(|e| {
                e.has_class_containing("oj-ti-art") || e.has_class_containing("title-article-norm")
            })
            .map(|h| super::article_id_from_header(&h.clean_text()))
            .unwrap_or_default();

        let mut article = Article::new(art_id);

        article.title = art
            .find_descendant(|e| {
                e.has_class_containing("oj-sti-art")
                    || e.has_class_containing("stitle-article-norm")
            })
            .map(Element::clean_text)
            .filter(|t| !t.is_empty());

        article.content = art
            .descendants()
            .filter(|e| is_content_node(e))
            .map(Element::clean_text)
            .filter(|t| !t.is_empty())
            .collect();

        article.references = collect_references(art);
        doc.body.push(article);
    }
}

/// Content paragraphs carry a `norm`-family class; `div` content blocks do
/// as well, excluding the title divs.
fn is_content_node(e: &Element) -> bool {
    (e.tag == "p" && e.has_class_containing("norm"))
        || (e.tag == "div"
            && e.has_class_containing("norm")
            && !e.has_class_containing("title"))
}

fn extract_annexes(root: &Element, doc: &mut ActDocument) {
    for anx in root
        .descendants()
        .filter(|e| e.tag == "div" && e.id_starts_with("anx_"))
    {
        let mut annex = Annex::new(anx.id().trim_start_matches("anx_"));

        annex.title = anx
            .find_descendant(|e| {
                e.has_class_containing("oj-doc-ti") || e.has_class_containing("title-annex-1")
            })
            .map(Element::clean_text)
            .unwrap_or_default();

        annex.content = anx
            .descendants()
            .filter(|e| (e.tag == "p" && e.has_class_containing("norm")) || e.tag == "tr")
            .map(Element::clean_text)
            .filter(|t| !t.is_empty())
            .collect();

        annex.references = collect_references(anx);
        doc.annexes.push(annex);
    }
}

fn extract_final_provisions(root: &Element, doc: &mut ActDocument) {
    let Some(fnp) = root.find_descendant(|e| e.tag == "div" && e.id_starts_with("fnp_")) else {
        return;
    };

    let final_text: Vec<String> = fnp
        .descendants()
        .filter(|e| e.tag == "p" && e.has_class_containing("norm"))
        .map(Element::clean_text)
        .collect();
    doc.final_provisions.text = Some(final_text.join(" "));

    let signatures: Vec<String> = fnp
        .descendants()
        .filter(|e| e.has_class_containing("signatory"))
        .map(Element::clean_text)
        .filter(|t| !t.is_empty())
        .collect();
    if !signatures.is_empty() {
        doc.final_provisions.signatures = Some(signatures);
    }
}
