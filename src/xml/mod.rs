//! XML loading: turns a document into a tree of [`XmlElement`]s.
//!
//! Only elements and their attributes are kept.  Text, comments and processing
//! instructions are dropped, since filter definitions are expressed entirely with
//! attributes.

use markup5ever::{buffer_queue::BufferQueue, LocalName};
use std::cell::RefCell;
use std::rc::Rc;
use xml5ever::tendril::StrTendril;
use xml5ever::tokenizer::{TagKind, Token, TokenSink, XmlTokenizer, XmlTokenizerOpts};

use crate::error::LoadingError;

mod attributes;

pub use attributes::Attributes;

/// An element and its children, in document order.
#[derive(Debug, Clone)]
pub struct XmlElement {
    pub name: LocalName,
    pub attributes: Attributes,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn new(name: LocalName, attributes: Attributes) -> XmlElement {
        XmlElement {
            name,
            attributes,
            children: Vec::new(),
        }
    }

    /// Returns the element's local name, without any namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.as_ref()
    }

    /// Iterates over this element and all its descendants, depth first.
    pub fn descendants(&self) -> Box<dyn Iterator<Item = &XmlElement> + '_> {
        Box::new(
            std::iter::once(self).chain(self.children.iter().flat_map(|c| c.descendants())),
        )
    }
}

#[derive(Default)]
struct TreeState {
    stack: Vec<XmlElement>,
    roots: Vec<XmlElement>,
    error: Option<String>,
}

impl TreeState {
    fn append(&mut self, element: XmlElement) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => self.roots.push(element),
        }
    }

    fn fail(&mut self, msg: String) {
        if self.error.is_none() {
            self.error = Some(msg);
        }
    }
}

struct TreeSink(Rc<RefCell<TreeState>>);

impl TokenSink for TreeSink {
    fn process_token(&mut self, token: Token) {
        let mut state = self.0.borrow_mut();

        match token {
            Token::TagToken(tag) => {
                let name = tag.name.local.clone();

                match tag.kind {
                    TagKind::StartTag => {
                        let attributes = Attributes::from_tag_attributes(&tag.attrs);
                        state.stack.push(XmlElement::new(name, attributes));
                    }

                    TagKind::EmptyTag => {
                        let attributes = Attributes::from_tag_attributes(&tag.attrs);
                        state.append(XmlElement::new(name, attributes));
                    }

                    TagKind::EndTag | TagKind::ShortTag => {
                        let open = state.stack.pop();

                        match open {
                            Some(element)
                                if tag.kind == TagKind::ShortTag || element.name == name =>
                            {
                                state.append(element)
                            }

                            Some(element) => state.fail(format!(
                                "mismatched end tag </{}>, expected </{}>",
                                name, element.name
                            )),

                            None => state.fail(format!("unexpected end tag </{name}>")),
                        }
                    }
                }
            }

            Token::ParseError(e) => state.fail(e.to_string()),

            _ => (),
        }
    }
}

/// Parses a complete XML document and returns its top-level elements.
pub fn parse_elements(data: &str) -> Result<Vec<XmlElement>, LoadingError> {
    let state = Rc::new(RefCell::new(TreeState::default()));

    let mut queue = BufferQueue::new();
    queue.push_back(StrTendril::from(data));

    let mut tokenizer = XmlTokenizer::new(TreeSink(state.clone()), XmlTokenizerOpts::default());
    tokenizer.run(&mut queue);
    tokenizer.end();

    let mut state = state.borrow_mut();

    if let Some(msg) = state.error.take() {
        return Err(LoadingError::XmlParseError(msg));
    }

    if let Some(element) = state.stack.last() {
        return Err(LoadingError::XmlParseError(format!(
            "unclosed element <{}>",
            element.name
        )));
    }

    Ok(std::mem::take(&mut state.roots))
}
