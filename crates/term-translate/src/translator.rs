use std::future::Future;

use atlas_common::translate::{TranslateClient, TranslatorConfig};

use crate::error::AppError;

/// Text translation as seen by the term file walker.
///
/// Implementations never fail: untranslatable text comes back unchanged.
pub trait Translator {
    fn translate(&self, text: &str) -> impl Future<Output = String>;
}

impl Translator for TranslateClient {
    async fn translate(&self, text: &str) -> String {
        self.translate_text(text).await
    }
}

pub fn http_translator(config: TranslatorConfig) -> Result<TranslateClient, AppError> {
    Ok(TranslateClient::new(config)?)
}
