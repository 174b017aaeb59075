use crate::report::FormatFields;

/// Replace `$name` and `${name}` placeholders with report fields.
///
/// Unknown placeholders are left untouched and `$$` yields a literal `$`.
pub fn substitute(template: &str, fields: &FormatFields) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        output.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            output.push('$');
            rest = tail;
            continue;
        }

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                let name = &braced[..end];
                if let Some(value) = fields.get(name) {
                    output.push_str(&value);
                    rest = &braced[end + 1..];
                    continue;
                }
            }
            output.push('$');
            rest = after;
            continue;
        }

        let ident_len = identifier_len(after);
        match fields.get(&after[..ident_len]) {
            Some(value) if ident_len > 0 => {
                output.push_str(&value);
                rest = &after[ident_len..];
            }
            _ => {
                output.push('$');
                rest = after;
            }
        }
    }

    output.push_str(rest);
    output
}

fn identifier_len(input: &str) -> usize {
    input
        .char_indices()
        .find(|(index, c)| {
            let allowed = c.is_ascii_alphabetic() || *c == '_' || (*index > 0 && c.is_ascii_digit());
            !allowed
        })
        .map_or(input.len(), |(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> FormatFields {
        FormatFields {
            available_updates: "linux, foo".to_string(),
            last_update: "2024-05-01T10:00:00+00:00".to_string(),
            matched_criteria: "available, critical".to_string(),
            matched_criteria_short: "av,cr".to_string(),
            score: 2,
            status_text: "Updates recommended".to_string(),
            update_count: 2,
        }
    }

    #[test]
    fn substitutes_known_placeholders() {
        let rendered = substitute("$status_text: $available_updates ($score)", &fields());
        assert_eq!(rendered, "Updates recommended: linux, foo (2)");
    }

    #[test]
    fn supports_braced_placeholders_next_to_text() {
        let rendered = substitute("${update_count}x [${matched_criteria_short}]", &fields());
        assert_eq!(rendered, "2x [av,cr]");
    }

    #[test]
    fn leaves_unknown_placeholders_verbatim() {
        let rendered = substitute("$nope ${also_nope} $ trailing $", &fields());
        assert_eq!(rendered, "$nope ${also_nope} $ trailing $");
    }

    #[test]
    fn double_dollar_is_a_literal() {
        assert_eq!(substitute("cost: $$score", &fields()), "cost: $score");
    }

    #[test]
    fn identifier_stops_at_punctuation() {
        assert_eq!(substitute("$score.", &fields()), "2.");
        assert_eq!(substitute("$last_update!", &fields()), "2024-05-01T10:00:00+00:00!");
    }
}
