//! Per task type extraction rules and storage schemas.

use scraper::Html;

use super::extract::{selector, single_text_field, text_of};
use crate::models::{Record, RecordSet, TaskType};

/// Everything that differs between task types.
pub trait TaskSpec: Send + Sync {
    fn task_type(&self) -> TaskType;

    /// Field names in output order. Every extracted record carries exactly these.
    fn schema(&self) -> &'static [&'static str];

    /// SQLite table the records are stored in.
    fn table(&self) -> &'static str {
        self.task_type().as_str()
    }

    fn default_url(&self) -> &'static str;

    fn extract_from(&self, document: &Html) -> RecordSet;

    /// Parse `content` as HTML and extract records. Nothing borrowed from
    /// `content` outlives the call.
    fn extract(&self, content: &str) -> RecordSet {
        let document = Html::parse_document(content);
        self.extract_from(&document)
    }
}

/// Look up the rules for a task type.
pub fn task_spec(task_type: TaskType) -> &'static dyn TaskSpec {
    match task_type {
        TaskType::News => &NewsSpec,
        TaskType::Books => &BooksSpec,
        TaskType::Music => &MusicSpec,
        TaskType::Movies => &MoviesSpec,
        TaskType::Vpn => &VpnSpec,
    }
}

/// Title placeholder for articles without a headline.
const NO_TITLE: &str = "No Title";

struct NewsSpec;

impl TaskSpec for NewsSpec {
    fn task_type(&self) -> TaskType {
        TaskType::News
    }

    fn schema(&self) -> &'static [&'static str] {
        &["title", "link"]
    }

    fn table(&self) -> &'static str {
        "public_opinion"
    }

    fn default_url(&self) -> &'static str {
        "https://news.google.com/"
    }

    fn extract_from(&self, document: &Html) -> RecordSet {
        let (Some(article), Some(headline), Some(anchor)) =
            (selector("article"), selector("h3"), selector("a"))
        else {
            return Vec::new();
        };

        document
            .select(&article)
            .map(|node| {
                let title = node
                    .select(&headline)
                    .next()
                    .map(text_of)
                    .unwrap_or_else(|| NO_TITLE.to_string());
                let link = node
                    .select(&anchor)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string);
                Record::new().with("title", Some(title)).with("link", link)
            })
            .collect()
    }
}

struct BooksSpec;

impl TaskSpec for BooksSpec {
    fn task_type(&self) -> TaskType {
        TaskType::Books
    }

    fn schema(&self) -> &'static [&'static str] {
        &["title"]
    }

    fn default_url(&self) -> &'static str {
        "https://www.goodreads.com/"
    }

    fn extract_from(&self, document: &Html) -> RecordSet {
        single_text_field(document, ".bookTitle", "title")
    }
}

struct MusicSpec;

impl TaskSpec for MusicSpec {
    fn task_type(&self) -> TaskType {
        TaskType::Music
    }

    fn schema(&self) -> &'static [&'static str] {
        &["song"]
    }

    fn default_url(&self) -> &'static str {
        "https://www.billboard.com/charts"
    }

    fn extract_from(&self, document: &Html) -> RecordSet {
        single_text_field(document, ".chart-element__information__song", "song")
    }
}

struct MoviesSpec;

impl TaskSpec for MoviesSpec {
    fn task_type(&self) -> TaskType {
        TaskType::Movies
    }

    fn schema(&self) -> &'static [&'static str] {
        &["movie"]
    }

    fn default_url(&self) -> &'static str {
        "https://www.imdb.com/chart/top"
    }

    fn extract_from(&self, document: &Html) -> RecordSet {
        single_text_field(document, ".titleColumn a", "movie")
    }
}

struct VpnSpec;

impl TaskSpec for VpnSpec {
    fn task_type(&self) -> TaskType {
        TaskType::Vpn
    }

    fn schema(&self) -> &'static [&'static str] {
        &["country", "ip"]
    }

    fn default_url(&self) -> &'static str {
        "https://www.vpngate.net/en/"
    }

    fn extract_from(&self, document: &Html) -> RecordSet {
        let (Some(row), Some(cell)) = (selector("table#vg_hosts_table tbody tr"), selector("td"))
        else {
            return Vec::new();
        };

        document
            .select(&row)
            .filter_map(|tr| {
                let cells: Vec<_> = tr.select(&cell).collect();
                // Header and spacer rows have fewer than two cells
                if cells.len() < 2 {
                    return None;
                }
                let ip = text_of(cells[0]).trim().to_string();
                let country = text_of(cells[1]).trim().to_string();
                Some(
                    Record::new()
                        .with("country", Some(country))
                        .with("ip", Some(ip)),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_names(records: &RecordSet) -> Vec<Vec<&'static str>> {
        records.iter().map(|r| r.field_names().collect()).collect()
    }

    #[test]
    fn test_news_title_fallback_and_missing_link() {
        let html = r#"
            <html><body>
              <article><h3>Markets rally</h3><a href="/story/1">read</a></article>
              <article><p>no headline</p><a href="/story/2">read</a></article>
              <article><h3>Quiet day</h3></article>
            </body></html>
        "#;
        let records = task_spec(TaskType::News).extract(html);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("title"), Some("Markets rally"));
        assert_eq!(records[0].get("link"), Some("/story/1"));
        assert_eq!(records[1].get("title"), Some("No Title"));
        assert_eq!(records[1].get("link"), Some("/story/2"));
        assert_eq!(records[2].get("title"), Some("Quiet day"));
        assert!(records[2].has_field("link"));
        assert_eq!(records[2].get("link"), None);
    }

    #[test]
    fn test_books_records_have_only_title() {
        let html = r#"
            <div class="bookTitle">  Dune </div>
            <a class="bookTitle" href="/b/2"><span>Emma</span></a>
            <div class="author">Frank Herbert</div>
        "#;
        let records = task_spec(TaskType::Books).extract(html);

        assert_eq!(field_names(&records), vec![vec!["title"], vec!["title"]]);
        assert_eq!(records[0].get("title"), Some("Dune"));
        assert_eq!(records[1].get("title"), Some("Emma"));
    }

    #[test]
    fn test_music_and_movies() {
        let music = task_spec(TaskType::Music).extract(
            r#"<ul><li><span class="chart-element__information__song"> Song A </span></li></ul>"#,
        );
        assert_eq!(music.len(), 1);
        assert_eq!(music[0].get("song"), Some("Song A"));

        let movies = task_spec(TaskType::Movies).extract(
            r#"<table><tr><td class="titleColumn"><a href="/t/1"> The Godfather </a></td></tr></table>"#,
        );
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].get("movie"), Some("The Godfather"));
    }

    #[test]
    fn test_vpn_rows_and_short_rows() {
        let html = r#"
            <table id="vg_hosts_table"><tbody>
              <tr><td>1.2.3.4</td><td> Japan </td><td>extra</td></tr>
              <tr><td colspan="3">spacer</td></tr>
              <tr><td>5.6.7.8</td><td>Korea</td></tr>
            </tbody></table>
        "#;
        let records = task_spec(TaskType::Vpn).extract(html);

        assert_eq!(records.len(), 2);
        assert_eq!(field_names(&records)[0], vec!["country", "ip"]);
        assert_eq!(records[0].get("country"), Some("Japan"));
        assert_eq!(records[0].get("ip"), Some("1.2.3.4"));
        assert_eq!(records[1].get("ip"), Some("5.6.7.8"));
    }

    #[test]
    fn test_vpn_without_table_is_empty() {
        let html = "<html><body><table id=\"other\"><tr><td>1</td><td>2</td></tr></table></body></html>";
        assert!(task_spec(TaskType::Vpn).extract(html).is_empty());
    }

    #[test]
    fn test_schema_and_tables() {
        assert_eq!(task_spec(TaskType::News).table(), "public_opinion");
        assert_eq!(task_spec(TaskType::Books).table(), "books");
        assert_eq!(task_spec(TaskType::Vpn).schema(), &["country", "ip"]);
        for task_type in TaskType::ALL {
            assert_eq!(task_spec(task_type).task_type(), task_type);
            assert!(task_spec(task_type).default_url().starts_with("https://"));
        }
    }
}
