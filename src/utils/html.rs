// src/utils/html.rs

/// Sanitizes uploaded question and option text with ammonia.
///
/// Safe inline markup (`<b>`, `<code>`, ...) survives; `<script>` elements,
/// event-handler attributes and similar are removed before the text reaches
/// the exam page or the admin results view.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
