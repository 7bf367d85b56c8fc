use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use ioa_core::domain::search::CriteriaField;
use ioa_core::types::date_range::{parse_date, DateRange};
use ioa_core::types::sort::SortOrder;
use ioa_core::CoreError;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Overrides IOA_API_BASE_URL.
    #[arg(long)]
    pub base_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a search and print one page of results.
    Search {
        #[arg(default_value = "")]
        query: String,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Print the full record for this tweet id if it is on the page.
        #[arg(long)]
        details: Option<String>,
    },
    /// Print aggregate charts for a query.
    Insights {
        query: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Fetch every matching record and write a CSV file.
    Export {
        #[arg(default_value = "")]
        query: String,
        #[command(flatten)]
        filters: FilterArgs,
        /// Output directory; defaults to IOA_EXPORT_DIR.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the globally most used hashtags.
    Suggestions,
    /// Interactive session with staged filters, paging and export.
    Shell,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Language code; omit for all languages.
    #[arg(long)]
    pub language: Option<String>,
    /// Start date (YYYY-MM-DD). Only applied together with --to.
    #[arg(long)]
    pub from: Option<String>,
    /// End date (YYYY-MM-DD). Only applied together with --from.
    #[arg(long)]
    pub to: Option<String>,
    #[arg(long, value_enum, default_value = "default")]
    pub sort: SortArg,
    /// Hashtag filter, with or without `#`. Repeatable.
    #[arg(long = "hashtag")]
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum SortArg {
    #[default]
    Default,
    Accuracy,
    Time,
    Retweets,
    Likes,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Default => SortOrder::Default,
            SortArg::Accuracy => SortOrder::Accuracy,
            SortArg::Time => SortOrder::Time,
            SortArg::Retweets => SortOrder::Retweets,
            SortArg::Likes => SortOrder::Likes,
        }
    }
}

impl FilterArgs {
    /// The filter edits these flags stage, in the order a user would make them.
    pub fn to_fields(&self) -> Result<Vec<CriteriaField>, CoreError> {
        let mut fields = vec![
            CriteriaField::Language(self.language.clone()),
            CriteriaField::Sort(self.sort.into()),
        ];
        let start = self.from.as_deref().map(parse_date).transpose()?;
        let end = self.to.as_deref().map(parse_date).transpose()?;
        if start.is_some() || end.is_some() {
            fields.push(CriteriaField::DateRange(DateRange::new(start, end)?));
        }
        for tag in &self.hashtags {
            fields.push(CriteriaField::AddHashtag(tag.clone()));
        }
        Ok(fields)
    }
}
