use super::{MergedEntity, TokenResult};

/// Prefix the WordPiece tokenizer puts on every fragment that continues the previous word
pub const CONTINUATION_MARKER: &str = "##";

/// Merge Error
#[derive(thiserror::Error, Debug)]
pub enum MergeError {
    /// The token stream could not be decoded, e.g. a record is missing a field
    #[error("malformed token stream: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A token carries no text at all
    #[error("token {index} has empty text")]
    EmptyText {
        /// Position of the offending token
        index: usize,
    },

    /// A token's confidence is not a probability
    #[error("token {index} ({text:?}) has confidence {confidence}, expected a value in [0, 1]")]
    InvalidConfidence {
        /// Position of the offending token
        index: usize,
        /// Text of the offending token
        text: String,
        /// The rejected value
        confidence: f64,
    },
}

/// Decode a JSON array of token records, rejecting records with missing fields
pub fn parse_tokens(json: &str) -> Result<Vec<TokenResult>, MergeError> {
    Ok(serde_json::from_str(json)?)
}

/// Fold continuation tokens into the word they continue.
///
/// Each `##`-prefixed token has its marker stripped and is appended to the
/// entity opened by the closest preceding plain token. The merged entity keeps
/// the leading token's label and the highest confidence of everything folded
/// into it. A continuation with nothing before it opens an entity of its own.
///
/// The whole stream is rejected if any token is structurally invalid.
pub fn merge_entities(tokens: &[TokenResult]) -> Result<Vec<MergedEntity>, MergeError> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut current: Option<MergedEntity> = None;

    for (index, token) in tokens.iter().enumerate() {
        validate(index, token)?;

        match token.text.strip_prefix(CONTINUATION_MARKER) {
            Some(fragment) => {
                if let Some(entity) = current.as_mut() {
                    entity.text.push_str(fragment);
                    entity.confidence = entity.confidence.max(token.confidence);
                } else {
                    current = Some(MergedEntity::new(
                        fragment.to_string(),
                        token.label.clone(),
                        token.confidence,
                    ));
                }
            }
            None => {
                let next = MergedEntity::new(token.text.clone(), token.label.clone(), token.confidence);

                if let Some(sealed) = current.replace(next).filter(|e| !e.text.is_empty()) {
                    merged.push(sealed);
                }
            }
        }
    }

    // A bare leading marker leaves nothing worth sealing
    merged.extend(current.filter(|e| !e.text.is_empty()));

    log::debug!("Merged {} tokens into {} entities", tokens.len(), merged.len());

    Ok(merged)
}

fn validate(index: usize, token: &TokenResult) -> Result<(), MergeError> {
    if token.text.is_empty() {
        return Err(MergeError::EmptyText { index });
    }

    // NaN fails the range check as well
    if !(0.0..=1.0).contains(&token.confidence) {
        return Err(MergeError::InvalidConfidence {
            index,
            text: token.text.clone(),
            confidence: token.confidence,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn token(text: &str, label: &str, confidence: f64) -> TokenResult {
        TokenResult::new(text.to_string(), label.to_string(), confidence)
    }

    fn entity(text: &str, label: &str, confidence: f64) -> MergedEntity {
        MergedEntity::new(text.to_string(), label.to_string(), confidence)
    }

    /// Tokens as produced for the default sentence
    fn sentence() -> Vec<TokenResult> {
        vec![
            token("The", "O", 0.99),
            token("patient", "O", 0.97),
            token("Para", "DRUG", 0.80),
            token("##ce", "DRUG", 0.70),
            token("##tamol", "DRUG", 0.95),
            token("and", "O", 0.99),
            token("Amoxicillin", "DRUG", 0.99),
            token("bacterial", "MISC", 0.5),
            token("in", "MISC", 0.6),
            token("##fection", "MISC", 0.4),
        ]
    }

    #[test]
    fn folds_continuation_into_previous_word() {
        let tokens = vec![token("Para", "DRUG", 0.80), token("##cetamol", "DRUG", 0.95)];

        let merged = merge_entities(&tokens).unwrap();

        assert_eq!(merged, vec![entity("Paracetamol", "DRUG", 0.95)]);
    }

    #[test]
    fn single_word_passes_through() {
        let tokens = vec![token("Amoxicillin", "DRUG", 0.99)];

        let merged = merge_entities(&tokens).unwrap();

        assert_eq!(merged, vec![entity("Amoxicillin", "DRUG", 0.99)]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let merged = merge_entities(&[]).unwrap();

        assert!(merged.is_empty());
    }

    #[test]
    fn separate_words_are_not_merged() {
        let tokens = vec![token("bacterial", "MISC", 0.5), token("infection", "MISC", 0.6)];

        let merged = merge_entities(&tokens).unwrap();

        assert_eq!(
            merged,
            vec![entity("bacterial", "MISC", 0.5), entity("infection", "MISC", 0.6)]
        );
    }

    #[test]
    fn label_comes_from_leading_token() {
        let tokens = vec![token("Amox", "DRUG", 0.4), token("##icillin", "MISC", 0.9)];

        let merged = merge_entities(&tokens).unwrap();

        assert_eq!(merged, vec![entity("Amoxicillin", "DRUG", 0.9)]);
    }

    #[test]
    fn confidence_is_max_not_mean() {
        let tokens = vec![
            token("Para", "DRUG", 0.2),
            token("##ce", "DRUG", 0.9),
            token("##tamol", "DRUG", 0.1),
        ];

        let merged = merge_entities(&tokens).unwrap();

        assert_eq!(merged, vec![entity("Paracetamol", "DRUG", 0.9)]);
    }

    #[test]
    fn leading_continuation_opens_its_own_entity() {
        let tokens = vec![token("##cetamol", "DRUG", 0.7), token("and", "O", 0.9)];

        let merged = merge_entities(&tokens).unwrap();

        assert_eq!(
            merged,
            vec![entity("cetamol", "DRUG", 0.7), entity("and", "O", 0.9)]
        );
    }

    #[test]
    fn bare_leading_marker_is_dropped() {
        let tokens = vec![token("##", "X", 0.5), token("Para", "DRUG", 0.8)];

        let merged = merge_entities(&tokens).unwrap();

        assert_eq!(merged, vec![entity("Para", "DRUG", 0.8)]);
    }

    #[test]
    fn lone_bare_marker_gives_empty_output() {
        let merged = merge_entities(&[token("##", "X", 0.5)]).unwrap();

        assert!(merged.is_empty());
    }

    #[test]
    fn merging_merged_output_is_idempotent() {
        let once = merge_entities(&sentence()).unwrap();
        let tokens: Vec<TokenResult> = once.iter().cloned().map(TokenResult::from).collect();

        let twice = merge_entities(&tokens).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn output_never_longer_than_input() {
        let tokens = sentence();
        let continuations = tokens
            .iter()
            .filter(|t| t.text.starts_with(CONTINUATION_MARKER))
            .count();

        let merged = merge_entities(&tokens).unwrap();

        assert_eq!(merged.len(), tokens.len() - continuations);
        assert!(merged.len() < tokens.len());
    }

    #[test]
    fn confidence_is_max_of_folded_tokens() {
        let tokens = sentence();

        let merged = merge_entities(&tokens).unwrap();

        // Walk the input alongside the output, grouping each leading token with its continuations
        let mut groups: Vec<Vec<&TokenResult>> = Vec::new();
        for t in &tokens {
            match groups.last_mut() {
                Some(group) if t.text.starts_with(CONTINUATION_MARKER) => group.push(t),
                _ => groups.push(vec![t]),
            }
        }

        assert_eq!(groups.len(), merged.len());
        for (group, entity) in groups.iter().zip(&merged) {
            let max = group.iter().map(|t| t.confidence).fold(f64::MIN, f64::max);

            assert!(group.iter().all(|t| entity.confidence >= t.confidence));
            assert_eq!(entity.confidence, max);
        }
    }

    #[test]
    fn preserves_order_of_leading_tokens() {
        let tokens = sentence();

        let merged = merge_entities(&tokens).unwrap();

        let leading: Vec<&str> = tokens
            .iter()
            .filter(|t| !t.text.starts_with(CONTINUATION_MARKER))
            .map(|t| t.text.as_str())
            .collect();

        assert_eq!(leading.len(), merged.len());
        for (lead, entity) in leading.iter().zip(&merged) {
            assert!(entity.text.starts_with(lead));
        }
        assert_eq!(merged[2].text, "Paracetamol");
        assert_eq!(merged[6].text, "infection");
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        let tokens = vec![token("Para", "DRUG", 0.8), token("##cetamol", "DRUG", 1.5)];

        let err = merge_entities(&tokens).unwrap_err();

        assert!(matches!(
            err,
            MergeError::InvalidConfidence { index: 1, confidence, .. } if confidence == 1.5
        ));
    }

    #[test]
    fn rejects_nan_confidence() {
        let tokens = vec![token("Para", "DRUG", f64::NAN)];

        let err = merge_entities(&tokens).unwrap_err();

        assert!(matches!(err, MergeError::InvalidConfidence { index: 0, .. }));
    }

    #[test]
    fn rejects_empty_text() {
        let tokens = vec![token("Para", "DRUG", 0.8), token("", "DRUG", 0.5)];

        let err = merge_entities(&tokens).unwrap_err();

        assert!(matches!(err, MergeError::EmptyText { index: 1 }));
    }

    #[test]
    fn parses_pipeline_records() {
        let json = r###"[
            {"word": "Para", "entity": "DRUG", "score": 0.80},
            {"word": "##cetamol", "entity": "DRUG", "score": 0.95}
        ]"###;

        let tokens = parse_tokens(json).unwrap();
        let merged = merge_entities(&tokens).unwrap();

        assert_eq!(merged, vec![entity("Paracetamol", "DRUG", 0.95)]);
    }

    #[test]
    fn rejects_record_missing_a_field() {
        let json = r#"[{"word": "Para", "score": 0.80}]"#;

        let err = parse_tokens(json).unwrap_err();

        assert!(matches!(err, MergeError::Malformed(_)));
        assert!(err.to_string().contains("entity"));
    }
}
