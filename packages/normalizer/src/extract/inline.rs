//! Extractor for the inline consolidated dialect.
//!
//! These files carry no structural classes at all: everything is styled
//! paragraphs. The title is the bold table text at the top, the preamble is
//! the grey-background block, and article and annex boundaries are italic
//! paragraphs matched against the heading phrases. Extraction is therefore a
//! stateful walk in document order.

use super::{collect_references, split_preamble, ExtractStrategy, ANNEX_START, ART_START};
use crate::error::Result;
use crate::markup::Element;
use crate::types::{ActDocument, Annex, Article};

pub struct InlineStrategy;

impl ExtractStrategy for InlineStrategy {
    fn extract(&self, root: &Element, doc: &mut ActDocument) -> Result<()> {
        let mut titles: Vec<String> = Vec::new();
        collect_title_paragraphs(root, false, &mut titles);
        if !titles.is_empty() {
            doc.metadata.title = titles.join(" ");
        }

        if let Some(grey) =
            root.find_descendant(|e| e.tag == "div" && e.style_contains("#CCCCCC"))
        {
            split_preamble(grey, &mut doc.preamble);
        }

        let mut scan = BodyScan::default();
        scan.walk(root);
        scan.finish(doc);

        Ok(())
    }
}

/// Title lines are the bold paragraphs inside the leading layout tables,
/// excluding amendment markers.
fn collect_title_paragraphs(node: &Element, in_table: bool, out: &mut Vec<String>) {
    for child in &node.children {
        let now_in_table = in_table || child.tag == "table";
        if child.tag == "p" && now_in_table && child.style_contains("font-weight: bold") {
            let text = child.clean_text();
            if !text.contains('▼') && text.chars().count() > 5 {
                out.push(text);
            }
        }
        collect_title_paragraphs(child, now_in_table, out);
    }
}

#[derive(Default)]
struct BodyScan {
    body: Vec<Article>,
    annexes: Vec<Annex>,
    current_article: Option<Article>,
    current_annex: Option<Annex>,
}

impl BodyScan {
    fn walk(&mut self, node: &Element) {
        for child in &node.children {
            // The grey preamble block is handled separately.
            if child.tag == "div" && child.style_contains("#CCCCCC") {
                continue;
            }
            if child.tag == "p" {
                self.paragraph(child);
            } else {
                self.walk(child);
            }
        }
    }

    fn paragraph(&mut self, p: &Element) {
        let text = p.clean_text();
        if text.is_empty() {
            return;
        }

        if p.style_contains("italic") {
            if let Some(caps) = ART_START.captures(&text) {
                self.close_article();
                self.close_annex();
                self.current_article = Some(Article::new(&caps[1]));
                return;
            }
            if ANNEX_START.is_match(&text) && text.chars().count() < 50 {
                self.close_article();
                self.close_annex();
                let id = ANNEX_START
                    .captures(&text)
                    .and_then(|c| c.get(2))
                    .map_or_else(
                        || (self.annexes.len() + 1).to_string(),
                        |m| m.as_str().to_string(),
                    );
                self.current_annex = Some(Annex::new(id));
                return;
            }
        }

        // Boldness is a substring test here; the source styles vary
        // between "font-weight: bold" and "font-weight:bold".
        let is_bold = p.style_contains("bold");

        if let Some(article) = self.current_article.as_mut() {
            if is_bold && article.title.is_none() && article.content.is_empty() {
                article.title = Some(text);
            } else {
                article.content.push(text);
                article.references.extend(collect_references(p));
            }
        } else if let Some(annex) = self.current_annex.as_mut() {
            if is_bold && annex.title.is_empty() && annex.content.is_empty() {
                annex.title = text;
            } else {
                annex.content.push(text);
                annex.references.extend(collect_references(p));
            }
        }
    }

    fn close_article(&mut self) {
        if let Some(article) = self.current_article.take() {
            self.body.push(article);
        }
    }

    fn close_annex(&mut self) {
        if let Some(annex) = self.current_annex.take() {
            self.annexes.push(annex);
        }
    }

    fn finish(mut self, doc: &mut ActDocument) {
        self.close_article();
        self.close_annex();
        doc.body = self.body;
        doc.annexes = self.annexes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_document;
    use crate::markup::parse_markup;
    use crate::types::Dialect;
    use pretty_assertions::assert_eq;

    fn sample() -> Element {
        parse_markup(
            r#"<html><body>
            <table><tr><td>
              <p style="font-weight: bold">RÅDETS FÖRORDNING (EEG) nr 737/90</p>
              <p style="font-weight: bold">▼B</p>
            </td></tr></table>
            <div style="background-color: #CCCCCC">
              <p>EUROPEISKA GEMENSKAPERNAS RÅD HAR ANTAGIT DENNA FÖRORDNING</p>
              <p>med beaktande av följande:</p>
              <p>Skäl ett.</p>
            </div>
            <p style="font-style: italic">Artikel 1</p>
            <p style="font-weight: bold">Tillämpningsområde</p>
            <p>Artikelns innehåll.</p>
            <p>Mer innehåll.</p>
            <p style="font-style: italic">Artikel 2</p>
            <p>Andra artikelns innehåll.</p>
            <p style="font-style: italic">BILAGA I</p>
            <p style="font-weight: bold">Förteckning över produkter</p>
            <p>Post 1.</p>
            </body></html>"#,
        )
    }

    #[test]
    fn test_inline_state_walk() {
        let doc = extract_document(&sample(), "31990R0737", Dialect::ConsolidatedInline).unwrap();

        assert_eq!(doc.metadata.title, "RÅDETS FÖRORDNING (EEG) nr 737/90");
        assert_eq!(doc.preamble.recitals.len(), 1);
        assert!(doc.preamble.intro_text.contains("HAR ANTAGIT"));

        assert_eq!(doc.body.len(), 2);
        assert_eq!(doc.body[0].id, "1");
        assert_eq!(doc.body[0].title.as_deref(), Some("Tillämpningsområde"));
        assert_eq!(
            doc.body[0].content,
            vec!["Artikelns innehåll.", "Mer innehåll."]
        );
        assert_eq!(doc.body[1].id, "2");
        assert!(doc.body[1].title.is_none());

        assert_eq!(doc.annexes.len(), 1);
        assert_eq!(doc.annexes[0].id, "I");
        assert_eq!(doc.annexes[0].title, "Förteckning över produkter");
        assert_eq!(doc.annexes[0].content, vec!["Post 1."]);
    }

    #[test]
    fn test_inline_annex_without_numeral_gets_ordinal() {
        let root = parse_markup(
            r#"<html><body>
            <p style="font-style: italic">Artikel 1</p>
            <p>Text.</p>
            <p style="font-style: italic">BILAGA</p>
            <p>Ensam bilaga.</p>
            </body></html>"#,
        );
        let doc = extract_document(&root, "31990R0737", Dialect::ConsolidatedInline).unwrap();
        assert_eq!(doc.annexes.len(), 1);
        assert_eq!(doc.annexes[0].id, "1");
        // Only a bold paragraph becomes the annex title.
        assert_eq!(doc.annexes[0].title, "");
        assert_eq!(doc.annexes[0].content, vec!["Ensam bilaga."]);
    }

    #[test]
    fn test_inline_marker_paragraphs_kept_in_body() {
        let root = parse_markup(
            r#"<html><body>
            <p style="font-style: italic">Artikel 1</p>
            <p style="font-weight:bold">Rubrik</p>
            <p>▼M1</p>
            <p>Text efter markören.</p>
            </body></html>"#,
        );
        let doc = extract_document(&root, "31990R0737", Dialect::ConsolidatedInline).unwrap();
        assert_eq!(doc.body[0].title.as_deref(), Some("Rubrik"));
        assert_eq!(doc.body[0].content, vec!["▼M1", "Text efter markören."]);
    }

    #[test]
    fn test_inline_article_header_closes_open_annex() {
        let root = parse_markup(
            r#"<html><body>
            <p style="font-style: italic">BILAGA</p>
            <p>Bilagetext.</p>
            <p style="font-style: italic">Artikel 5</p>
            <p>Artikeltext.</p>
            </body></html>"#,
        );
        let doc = extract_document(&root, "31990R0737", Dialect::ConsolidatedInline).unwrap();
        assert_eq!(doc.annexes.len(), 1);
        assert_eq!(doc.annexes[0].content, vec!["Bilagetext."]);
        assert_eq!(doc.body.len(), 1);
        assert_eq!(doc.body[0].id, "5");
        assert_eq!(doc.body[0].content, vec!["Artikeltext."]);
    }

    #[test]
    fn test_inline_preamble_text_not_duplicated_in_body() {
        let doc = extract_document(&sample(), "31990R0737", Dialect::ConsolidatedInline).unwrap();
        assert!(doc
            .body
            .iter()
            .flat_map(|a| &a.content)
            .all(|c| !c.contains("Skäl ett")));
    }
}
