use crate::app::enrich::EnrichmentStage;
use crate::app::output::{LinkedPair, OutputRecord, OutputWriter};
use crate::core::reconcile::ReconciliationEngine;
use crate::domain::input::FileInput;
use crate::domain::model::{Receipt, TranscribedStatements};
use crate::domain::ports::{Categorizer, Storage, Transcriber, VendorMatcher};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use futures::{stream, StreamExt, TryStreamExt};
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct LinkOptions {
    pub output_path: String,
    pub csv_output_path: Option<String>,
    pub concurrent_requests: usize,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            output_path: "linked_transactions.json".to_string(),
            csv_output_path: None,
            concurrent_requests: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinkReport {
    pub output_path: String,
    pub matched: usize,
    pub unmatched: usize,
    pub records: Vec<OutputRecord>,
}

/// Runs a whole link: transcribe, reconcile, categorize (optional), write.
pub struct Linker<T, M, C, S>
where
    T: Transcriber,
    M: VendorMatcher,
    C: Categorizer,
    S: Storage,
{
    transcriber: T,
    engine: ReconciliationEngine<M>,
    enrichment: Option<EnrichmentStage<C>>,
    writer: OutputWriter<S>,
    options: LinkOptions,
}

impl<T, M, C, S> Linker<T, M, C, S>
where
    T: Transcriber,
    M: VendorMatcher,
    C: Categorizer,
    S: Storage,
{
    pub fn new(transcriber: T, matcher: M, storage: S, options: LinkOptions) -> Self {
        Self {
            transcriber,
            engine: ReconciliationEngine::new(matcher),
            enrichment: None,
            writer: OutputWriter::new(storage),
            options,
        }
    }

    pub fn with_categorizer(mut self, categorizer: C) -> Self {
        self.enrichment = Some(EnrichmentStage::new(categorizer));
        self
    }

    pub async fn run(&self, receipts: &[FileInput], statements: &[FileInput]) -> Result<LinkReport> {
        let started = Instant::now();
        tracing::info!(
            "Linking {} receipts against {} statements",
            receipts.len(),
            statements.len()
        );

        let receipts = self.transcribe_receipts(receipts).await?;
        tracing::info!("Transcribed {} receipts", receipts.len());

        let statements = self.transcribe_statements(statements).await?;
        tracing::info!(
            "Transcribed {} statements with {} transactions",
            statements.transcribed_statements.len(),
            statements.transactions().len()
        );

        let pairs = self.engine.reconcile_statements(&statements, receipts).await?;
        for pair in pairs.iter().filter(|p| !p.is_matched()) {
            tracing::warn!(
                "No receipt for '{}' on {}",
                pair.transaction.name,
                pair.transaction.datetime.date()
            );
        }

        let linked: Vec<LinkedPair> = match &self.enrichment {
            Some(stage) => {
                tracing::info!("Categorizing {} pairs", pairs.len());
                stage
                    .enrich(pairs)
                    .await?
                    .into_iter()
                    .map(LinkedPair::Categorized)
                    .collect()
            }
            None => pairs.into_iter().map(LinkedPair::Plain).collect(),
        };

        let records = OutputRecord::assign_ids(linked);
        self.writer.write_json(&self.options.output_path, &records).await?;
        if let Some(csv_path) = &self.options.csv_output_path {
            self.writer.write_csv(csv_path, &records).await?;
        }

        let matched = records.iter().filter(|r| r.pair.is_matched()).count();
        let report = LinkReport {
            output_path: self.options.output_path.clone(),
            matched,
            unmatched: records.len() - matched,
            records,
        };
        tracing::info!(
            "Linked {} of {} transactions in {:?}",
            report.matched,
            report.records.len(),
            started.elapsed()
        );
        Ok(report)
    }

    async fn transcribe_receipts(&self, inputs: &[FileInput]) -> Result<Vec<Receipt>> {
        let receipts: Vec<Receipt> = stream::iter(inputs)
            .map(|input| self.transcriber.transcribe_receipt(input))
            .buffered(self.concurrency())
            .try_collect()
            .await?;

        receipts.iter().try_for_each(|receipt| receipt.validate())?;
        Ok(receipts)
    }

    async fn transcribe_statements(&self, inputs: &[FileInput]) -> Result<TranscribedStatements> {
        let documents: Vec<TranscribedStatements> = stream::iter(inputs)
            .map(|input| self.transcriber.transcribe_statement(input))
            .buffered(self.concurrency())
            .try_collect()
            .await?;

        let statements = TranscribedStatements::merge(documents);
        statements.validate()?;
        Ok(statements)
    }

    fn concurrency(&self) -> usize {
        self.options.concurrent_requests.max(1)
    }
}
