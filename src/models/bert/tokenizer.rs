use std::path::Path;

use anyhow::anyhow;
use tokenizers::{
    decoders::{wordpiece::WordPiece as WordPieceDecoder, DecoderWrapper},
    models::{wordpiece::WordPiece, ModelWrapper},
    normalizers::{bert::BertNormalizer, NormalizerWrapper},
    pre_tokenizers::{bert::BertPreTokenizer, PreTokenizerWrapper},
    processors::{bert::BertProcessing, PostProcessorWrapper},
    Model as _, Tokenizer, TokenizerBuilder,
};

use crate::pipelines::token_classification::CONTINUATION_MARKER;

const UNK_TOKEN: &str = "[UNK]";
const CLS_TOKEN: &str = "[CLS]";
const SEP_TOKEN: &str = "[SEP]";

/// Load a serialized `tokenizer.json`
pub fn from_json(tokenizer_file: &Path) -> anyhow::Result<Tokenizer> {
    Tokenizer::from_file(tokenizer_file).map_err(|e| {
        anyhow!(
            "Unable to load tokenizer {}: {}",
            tokenizer_file.display(),
            e
        )
    })
}

/// Build a cased BERT WordPiece tokenizer from a bare `vocab.txt`.
///
/// Older checkpoints only ship the vocabulary, so the normalizer,
/// pre-tokenizer and `[CLS] ... [SEP]` post-processor are assembled here.
pub fn from_vocab(vocab_file: &Path) -> anyhow::Result<Tokenizer> {
    let vocab = vocab_file
        .to_str()
        .ok_or_else(|| anyhow!("Vocabulary path is not valid UTF-8: {}", vocab_file.display()))?;

    let wordpiece = WordPiece::from_file(vocab)
        .unk_token(UNK_TOKEN.to_string())
        .continuing_subword_prefix(CONTINUATION_MARKER.to_string())
        .build()
        .map_err(|e| anyhow!("Unable to build WordPiece model: {}", e))?;

    let special = |token: &str| {
        wordpiece
            .token_to_id(token)
            .map(|id| (token.to_string(), id))
            .ok_or_else(|| anyhow!("Vocabulary has no {} token", token))
    };
    let processor = BertProcessing::new(special(SEP_TOKEN)?, special(CLS_TOKEN)?);

    let tokenizer = TokenizerBuilder::<
        ModelWrapper,
        NormalizerWrapper,
        PreTokenizerWrapper,
        PostProcessorWrapper,
        DecoderWrapper,
    >::new()
    .with_model(wordpiece.into())
    // clean text, split CJK characters, keep accents and case
    .with_normalizer(Some(BertNormalizer::new(true, true, Some(false), false).into()))
    .with_pre_tokenizer(Some(BertPreTokenizer.into()))
    .with_post_processor(Some(processor.into()))
    .with_decoder(Some(WordPieceDecoder::default().into()))
    .build()
    .map_err(|e| anyhow!("Unable to build tokenizer: {}", e))?;

    Ok(Tokenizer::from(tokenizer))
}
