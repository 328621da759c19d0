pub mod batch;
pub mod categories;
pub mod config;
pub mod extract;
pub mod import;
pub mod serve;

use clap::Args;

use expensa_core::{ExpensaConfig, Ingestor};

/// Row filters shared by the commands that read statements.
#[derive(Args, Debug, Default, Clone, Copy)]
pub struct FilterArgs {
    /// Leave credits (money received) out
    #[arg(long)]
    skip_credits: bool,

    /// Leave failed and pending rows out
    #[arg(long)]
    skip_unsettled: bool,
}

impl FilterArgs {
    /// Apply the flags on top of the configured filters.
    pub fn apply(&self, ingestor: Ingestor, config: &ExpensaConfig) -> Ingestor {
        ingestor
            .with_skip_credits(self.skip_credits || config.normalize.skip_credits)
            .with_skip_unsettled(self.skip_unsettled || config.normalize.skip_unsettled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clap::Parser;
    use expensa_core::{
        DefaultCategories, Direction, ParsedTransaction, PaymentMethod, SkipReason,
        TransactionStatus,
    };

    #[derive(Parser)]
    struct FilterCli {
        #[command(flatten)]
        filters: FilterArgs,
    }

    fn transaction(direction: Direction, status: TransactionStatus) -> ParsedTransaction {
        ParsedTransaction {
            transaction_date: NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
            merchant_name: "Rahul Sharma".to_string(),
            amount: rust_decimal::Decimal::from(1500i64),
            direction,
            payment_method: PaymentMethod::DigitalWallet,
            status,
            reference: None,
            line: 0,
            pattern: "month_name_direction".to_string(),
        }
    }

    fn build_ingestor(args: &[&str], config: &ExpensaConfig) -> Ingestor {
        let cli = FilterCli::parse_from(std::iter::once("expensa").chain(args.iter().copied()));
        cli.filters
            .apply(Ingestor::from_config(config, &DefaultCategories).unwrap(), config)
    }

    #[test]
    fn test_everything_kept_by_default() {
        let ingestor = build_ingestor(&[], &ExpensaConfig::default());
        let credit = transaction(Direction::Credit, TransactionStatus::Success);
        let failed = transaction(Direction::Debit, TransactionStatus::Failed);

        assert_eq!(ingestor.filter(&credit), None);
        assert_eq!(ingestor.filter(&failed), None);
    }

    #[test]
    fn test_flags_enable_filters() {
        let config = ExpensaConfig::default();
        let credit = transaction(Direction::Credit, TransactionStatus::Success);
        let pending = transaction(Direction::Debit, TransactionStatus::Pending);

        let ingestor = build_ingestor(&["--skip-credits"], &config);
        assert_eq!(ingestor.filter(&credit), Some(SkipReason::Credit));
        assert_eq!(ingestor.filter(&pending), None);

        let ingestor = build_ingestor(&["--skip-unsettled"], &config);
        assert_eq!(ingestor.filter(&credit), None);
        assert_eq!(ingestor.filter(&pending), Some(SkipReason::NotSettled));
    }

    #[test]
    fn test_config_filters_apply_without_flags() {
        let mut config = ExpensaConfig::default();
        config.normalize.skip_credits = true;

        let ingestor = build_ingestor(&[], &config);
        let credit = transaction(Direction::Credit, TransactionStatus::Success);
        assert_eq!(ingestor.filter(&credit), Some(SkipReason::Credit));
    }
}
