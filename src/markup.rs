//! What the translation engine needs from a wikitext parser.
//!
//! The engine only enumerates templates, renames templates and parameters in
//! place, and serializes the result through `Display`. Any parser exposing
//! those three capabilities can be plugged in; [`crate::wikitext::Document`]
//! is the bundled one.

use std::fmt;

/// A parsed document that serializes back to wikitext.
pub trait Markup: fmt::Display {
    type Template: TemplateNode;

    /// Visit every template in document order, parents before the templates
    /// nested in their parameters.
    fn visit_templates(&self, visit: &mut dyn FnMut(&Self::Template));

    /// Same walk as [`Markup::visit_templates`], with mutable access. Templates
    /// nested inside a parameter are visited after `visit` returns for their
    /// parent.
    fn visit_templates_mut(&mut self, visit: &mut dyn FnMut(&mut Self::Template));
}

pub trait TemplateNode {
    type Param: ParamNode;

    /// Raw name, including surrounding whitespace.
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn params_mut(&mut self) -> &mut [Self::Param];
}

pub trait ParamNode {
    /// Raw name, including surrounding whitespace. Positional parameters are
    /// named by their 1-based position.
    fn name(&self) -> &str;

    /// Renaming a positional parameter leaves it positional; its new name
    /// only shows once [`ParamNode::show_key`] is called.
    fn set_name(&mut self, name: String);

    /// Write the parameter as `name=value` from now on.
    fn show_key(&mut self);

    fn is_positional(&self) -> bool;
}
