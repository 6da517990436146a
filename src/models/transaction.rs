use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::store::Entity;

/// Ordered list of record ids created within one transaction.
///
/// The reconciler's positional matching always addresses the most
/// recently appended entry: a pool's Mint/Burn confirmation completes the
/// record its preceding Transfer created. Keeping append, peek-last,
/// pop-last, and replace-last behind one type enforces that contract at a
/// single call site.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RecordQueue(Vec<String>);

impl RecordQueue {
    /// Append a record id.
    pub fn append(&mut self, id: String) {
        self.0.push(id);
    }

    /// The most recently appended id, if any.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Remove and return the most recently appended id.
    pub fn pop_last(&mut self) -> Option<String> {
        self.0.pop()
    }

    /// Replace the most recently appended id in place. Appends when the
    /// queue is empty.
    pub fn replace_last(&mut self, id: String) {
        match self.0.last_mut() {
            Some(last) => *last = id,
            None => self.0.push(id),
        }
    }

    /// Number of ids held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the queue holds no ids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One chain transaction and the logical records assembled within it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction hash, lower-case hex
    pub id: String,
    /// Block the transaction was mined in
    pub block_number: u64,
    /// Block timestamp, seconds
    pub timestamp: u64,
    /// Gas used, zero when the receipt was unavailable
    pub gas_used: BigDecimal,
    /// Gas price, zero when the receipt was unavailable
    pub gas_price: BigDecimal,
    /// Logical mints, in creation order
    pub mints: RecordQueue,
    /// Logical burns, in creation order
    pub burns: RecordQueue,
    /// Swaps, in creation order
    pub swaps: RecordQueue,
}

impl Entity for Transaction {
    const KIND: &'static str = "Transaction";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One logical liquidity addition, assembled from a pool-token mint
/// transfer and the pool's Mint confirmation.
///
/// Until the confirmation arrives the record is provisional: `sender` is
/// unset and the amount fields are empty. A provisional record that is
/// never confirmed before a burn finalizes is a fee mint and gets
/// absorbed into the burn.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MintRecord {
    /// `<txHash>-<indexWithinTx>`
    pub id: String,
    /// Enclosing transaction id
    pub transaction: String,
    /// Pool entity id
    pub pair: String,
    /// Recipient of the minted pool tokens
    pub to: String,
    /// Pool-token amount minted, decimal
    pub liquidity: BigDecimal,
    /// Block timestamp, seconds
    pub timestamp: u64,
    /// Liquidity supplier; set by the Mint confirmation
    pub sender: Option<String>,
    /// token0 deposited; set by the Mint confirmation
    pub amount0: Option<BigDecimal>,
    /// token1 deposited; set by the Mint confirmation
    pub amount1: Option<BigDecimal>,
    /// USD value of the deposit; set by the Mint confirmation
    pub amount_usd: Option<BigDecimal>,
    /// Log index of the Mint confirmation
    pub log_index: Option<u64>,
}

impl MintRecord {
    /// Whether the pool's Mint confirmation has filled this record.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.sender.is_some()
    }
}

impl Entity for MintRecord {
    const KIND: &'static str = "Mint";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One logical liquidity removal.
///
/// `needs_complete` marks a record created eagerly from the staging
/// transfer (LP sends pool tokens back to the pool) before the pool's
/// Burn event is guaranteed to follow; the finalizing transfer reuses it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BurnRecord {
    /// `<txHash>-<indexWithinTx>`
    pub id: String,
    /// Enclosing transaction id
    pub transaction: String,
    /// Pool entity id
    pub pair: String,
    /// Pool-token amount burned, decimal
    pub liquidity: BigDecimal,
    /// Block timestamp, seconds
    pub timestamp: u64,
    /// Created from a staging transfer and awaiting finalization
    pub needs_complete: bool,
    /// Account whose pool tokens were staged
    pub sender: Option<String>,
    /// Staging-transfer recipient (the pool itself)
    pub to: Option<String>,
    /// token0 withdrawn; set by the Burn confirmation
    pub amount0: Option<BigDecimal>,
    /// token1 withdrawn; set by the Burn confirmation
    pub amount1: Option<BigDecimal>,
    /// USD value of the withdrawal; set by the Burn confirmation
    pub amount_usd: Option<BigDecimal>,
    /// Log index of the Burn confirmation
    pub log_index: Option<u64>,
    /// Recipient of an absorbed fee mint
    pub fee_to: Option<String>,
    /// Liquidity of an absorbed fee mint
    pub fee_liquidity: Option<BigDecimal>,
}

impl Entity for BurnRecord {
    const KIND: &'static str = "Burn";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One executed swap.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwapRecord {
    /// `<txHash>-<indexWithinTx>`
    pub id: String,
    /// Enclosing transaction id
    pub transaction: String,
    /// Pool entity id
    pub pair: String,
    /// Address that initiated the swap
    pub sender: String,
    /// Recipient of the output
    pub to: String,
    /// token0 paid in, decimal
    pub amount0_in: BigDecimal,
    /// token1 paid in, decimal
    pub amount1_in: BigDecimal,
    /// token0 paid out, decimal
    pub amount0_out: BigDecimal,
    /// token1 paid out, decimal
    pub amount1_out: BigDecimal,
    /// Swap value in USD: tracked when available, otherwise the
    /// untracked estimate
    pub amount_usd: BigDecimal,
    /// Log index of the Swap event
    pub log_index: u64,
    /// Block timestamp, seconds
    pub timestamp: u64,
}

impl Entity for SwapRecord {
    const KIND: &'static str = "Swap";

    fn id(&self) -> &str {
        &self.id
    }
}
