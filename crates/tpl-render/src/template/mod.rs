//! Template compilation and execution.
//!
//! The render engine talks to templates through the [`TemplateEngine`] trait.
//! [`MiniJinjaEngine`] is the implementation used by the `tpl` binary: Jinja
//! syntax, the function registry installed as globals, and output that
//! reproduces the template text byte for byte outside of its tags.
//!
//! ## Missing keys
//!
//! How a reference to an absent value behaves is chosen per render with
//! [`MissingKeyPolicy`]:
//!
//! | Policy | `{{ absent }}` | `{{ absent.field }}` |
//! |--------|----------------|----------------------|
//! | `Strict` | error naming `absent` | error naming `absent` |
//! | `Lenient` | empty | empty |

mod engine;

pub use engine::{MiniJinjaEngine, MissingKeyPolicy, TemplateEngine};
