use crate::domain::model::{Receipt, ReconciledPair, Transaction, TranscribedStatements};
use crate::domain::ports::VendorMatcher;
use crate::utils::error::Result;
use rust_decimal::Decimal;

/// Receipts not yet claimed during one reconciliation run. Only shrinks.
struct CandidatePool {
    receipts: Vec<Receipt>,
}

impl CandidatePool {
    fn new(receipts: Vec<Receipt>) -> Self {
        Self { receipts }
    }

    /// Pool positions whose grand total equals `amount` exactly, in pool order.
    fn price_matches(&self, amount: Decimal) -> Vec<usize> {
        self.receipts
            .iter()
            .enumerate()
            .filter(|(_, receipt)| receipt.grand_total == amount)
            .map(|(index, _)| index)
            .collect()
    }

    fn vendor(&self, index: usize) -> &str {
        &self.receipts[index].vendor
    }

    // `remove` rather than `swap_remove`: later price matches must keep
    // seeing receipts in their original order.
    fn claim(&mut self, index: usize) -> Receipt {
        self.receipts.remove(index)
    }

    fn len(&self) -> usize {
        self.receipts.len()
    }
}

/// Pairs statement transactions with receipts.
///
/// Each transaction is handled in input order against a shared pool:
///
/// 1. receipts whose `grand_total` equals the withdrawal amount are candidates;
///    a transaction without a withdrawal amount has none;
/// 2. no candidate leaves the transaction unmatched;
/// 3. a single candidate is claimed without consulting the vendor matcher;
/// 4. with several candidates the vendor matcher is asked about each in pool
///    order and the first `true` wins. If none agrees, the transaction is
///    unmatched and every candidate stays in the pool.
///
/// A matcher failure aborts the whole run.
pub struct ReconciliationEngine<M: VendorMatcher> {
    matcher: M,
}

impl<M: VendorMatcher> ReconciliationEngine<M> {
    pub fn new(matcher: M) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    pub async fn reconcile(
        &self,
        transactions: Vec<Transaction>,
        receipts: Vec<Receipt>,
    ) -> Result<Vec<ReconciledPair>> {
        tracing::debug!(
            "Reconciling {} transactions against {} receipts",
            transactions.len(),
            receipts.len()
        );

        let mut pool = CandidatePool::new(receipts);
        let mut pairs = Vec::with_capacity(transactions.len());

        for transaction in transactions {
            let claimed = self.select(&transaction, &pool).await?;
            let pair = match claimed {
                Some(index) => ReconciledPair::matched(transaction, pool.claim(index)),
                None => ReconciledPair::unmatched(transaction),
            };
            pairs.push(pair);
        }

        tracing::debug!(
            "Reconciliation finished: {} of {} transactions matched, {} receipts unclaimed",
            pairs.iter().filter(|p| p.is_matched()).count(),
            pairs.len(),
            pool.len()
        );
        Ok(pairs)
    }

    /// Flattens every statement into one transaction sequence sharing a
    /// single pool.
    pub async fn reconcile_statements(
        &self,
        statements: &TranscribedStatements,
        receipts: Vec<Receipt>,
    ) -> Result<Vec<ReconciledPair>> {
        self.reconcile(statements.transactions(), receipts).await
    }

    async fn select(&self, transaction: &Transaction, pool: &CandidatePool) -> Result<Option<usize>> {
        let Some(amount) = transaction.withdrawal_amount else {
            tracing::debug!("'{}' has no withdrawal amount, leaving unmatched", transaction.name);
            return Ok(None);
        };

        let candidates = pool.price_matches(amount);
        match candidates.as_slice() {
            [] => {
                tracing::debug!("'{}' ({}): no receipt with that total", transaction.name, amount);
                Ok(None)
            }
            [only] => {
                tracing::debug!(
                    "'{}' ({}): unique price match with '{}'",
                    transaction.name,
                    amount,
                    pool.vendor(*only)
                );
                Ok(Some(*only))
            }
            _ => {
                tracing::debug!(
                    "'{}' ({}): {} receipts share the total, checking vendors",
                    transaction.name,
                    amount,
                    candidates.len()
                );
                for &index in &candidates {
                    if self.matcher.matches(pool.vendor(index), &transaction.name).await? {
                        tracing::debug!(
                            "'{}' ({}): vendor match with '{}'",
                            transaction.name,
                            amount,
                            pool.vendor(index)
                        );
                        return Ok(Some(index));
                    }
                }
                tracing::debug!(
                    "'{}' ({}): no vendor agreed, candidates stay in the pool",
                    transaction.name,
                    amount
                );
                Ok(None)
            }
        }
    }
}
