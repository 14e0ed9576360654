use pagewright_traits::FontStyleSet;

/// Font name with the conventional style suffix, e.g. `Family-BoldItalic`.
pub fn styled_font_name(base_name: &str, style: FontStyleSet) -> String {
    let mut name = base_name.to_string();
    if style.bold || style.italic {
        name.push('-');
        if style.bold && style.italic {
            name.push_str("BoldItalic");
        } else if style.bold {
            name.push_str("Bold");
        } else {
            name.push_str("Italic");
        }
    }
    name
}
