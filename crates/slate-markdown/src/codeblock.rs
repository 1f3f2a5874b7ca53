//! Fenced code block rendering.

use slate_search::{Element, Node};

/// Class every code block carries; the highlighter stylesheet keys off it.
pub const HIGHLIGHT_CLASS: &str = "highlight";

/// Language from a code fence info string (first word, lowercase).
pub fn fence_language(info: &str) -> Option<String> {
    info.split_whitespace()
        .next()
        .map(str::to_lowercase)
        .filter(|lang| !lang.is_empty())
}

/// Empty `<pre class="highlight LANG">` shell for a code block.
pub fn code_block_shell(language: Option<&str>) -> Element {
    let pre = Element::new("pre").with_class(HIGHLIGHT_CLASS);
    match language {
        Some(lang) => pre.with_class(lang),
        None => pre,
    }
}

/// Move the collected source of a code block shell into its `<code>` child.
pub fn finish_code_block(pre: &mut Element) {
    let source = std::mem::take(&mut pre.children);
    let mut code = Element::new("code");
    code.children = source;
    pre.children = vec![Node::Element(code)];
}
