//! NCBI E-utilities adapter for the [`RecordSource`] capability.
//!
//! Records are fetched from the nucleotide database as GenBank flat files and parsed
//! with `gb-io`.

use std::io::Cursor;
use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use gb_io::reader::SeqReader;
use tracing::debug;

use super::{ExternalError, GenBankRecord, RecordSource};

pub const DEFAULT_EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

const TOOL_NAME: &str = "fish-probes";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// NCBI allows three requests per second without an API key
const MIN_INTERVAL: Duration = Duration::from_millis(334);
/// and ten with one
const MIN_INTERVAL_WITH_KEY: Duration = Duration::from_millis(100);

/// Blocking E-utilities `efetch` client.
///
/// Requests are spaced to stay within NCBI's rate limit; clones share the limit.
#[derive(Debug, Clone)]
pub struct EntrezClient {
    client: reqwest::blocking::Client,
    base_url: String,
    email: Option<String>,
    api_key: Option<String>,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl EntrezClient {
    /// # Errors
    ///
    /// Returns `ExternalError::Http` if the HTTP client cannot be built.
    pub fn new(email: Option<String>, api_key: Option<String>) -> Result<Self, ExternalError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_EFETCH_URL.to_string(),
            email: email.filter(|e| !e.trim().is_empty()),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            last_request: Arc::new(Mutex::new(None)),
        })
    }

    /// Point the client at a different `efetch` endpoint
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn min_interval(&self) -> Duration {
        if self.api_key.is_some() {
            MIN_INTERVAL_WITH_KEY
        } else {
            MIN_INTERVAL
        }
    }

    /// Sleep until the minimum interval since the previous request has passed.
    ///
    /// The lock is held while sleeping so concurrent callers queue up.
    fn throttle(&self) {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = *last {
            let wait = self.min_interval().saturating_sub(previous.elapsed());
            if !wait.is_zero() {
                debug!("Waiting {:?} before the next E-utilities request", wait);
                std::thread::sleep(wait);
            }
        }
        *last = Some(Instant::now());
    }

    fn query_params<'a>(&'a self, accession: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![
            ("db", "nucleotide"),
            ("id", accession),
            ("rettype", "gb"),
            ("retmode", "text"),
            ("tool", TOOL_NAME),
        ];
        if let Some(email) = &self.email {
            params.push(("email", email));
        }
        if let Some(key) = &self.api_key {
            params.push(("api_key", key));
        }
        params
    }
}

impl RecordSource for EntrezClient {
    fn fetch_record(&self, accession: &str) -> Result<GenBankRecord, ExternalError> {
        self.throttle();
        debug!("Fetching {} from {}", accession, self.base_url);

        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query_params(accession))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ExternalError::Service {
                accession: accession.to_string(),
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        parse_genbank_text(accession, &body)
    }
}

/// Parse the first record of a GenBank flat file.
///
/// The coding region is taken from the last `CDS` feature in the record.
///
/// # Errors
///
/// Returns `ExternalError::EmptyRecord` if the text holds no record, or
/// `ExternalError::GenBank` if it cannot be parsed.
pub fn parse_genbank_text(accession: &str, text: &str) -> Result<GenBankRecord, ExternalError> {
    let invalid = |message: String| ExternalError::GenBank {
        accession: accession.to_string(),
        message,
    };

    let seq = SeqReader::new(Cursor::new(text.as_bytes()))
        .next()
        .ok_or_else(|| ExternalError::EmptyRecord(accession.to_string()))?
        .map_err(|e| invalid(e.to_string()))?;

    let mut cds: Option<Range<usize>> = None;
    for feature in seq.features.iter().filter(|f| f.kind.to_string() == "CDS") {
        let (start, end) = feature
            .location
            .find_bounds()
            .map_err(|e| invalid(format!("unreadable CDS location: {e:?}")))?;
        let start = usize::try_from(start).map_err(|_| invalid(format!("CDS start {start}")))?;
        let end = usize::try_from(end).map_err(|_| invalid(format!("CDS end {end}")))?;
        cds = Some(start..end);
    }

    let sequence = String::from_utf8_lossy(&seq.seq).to_ascii_uppercase();
    if sequence.is_empty() {
        return Err(invalid("record has no sequence".to_string()));
    }

    Ok(GenBankRecord {
        accession: seq
            .accession
            .clone()
            .unwrap_or_else(|| accession.to_string()),
        description: seq.definition.clone().unwrap_or_default(),
        sequence,
        cds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = "\
LOCUS       TEST0001                  40 bp    mRNA    linear   ROD 01-JAN-2024
DEFINITION  Mus musculus tyrosine hydroxylase (Th), mRNA.
ACCESSION   TEST0001
VERSION     TEST0001.1
FEATURES             Location/Qualifiers
     source          1..40
                     /organism=\"Mus musculus\"
     CDS             5..34
                     /gene=\"Th\"
ORIGIN
        1 acgtacgtac gtacgtacgt acgtacgtac gtacgtacgt
//
";

    #[test]
    fn test_parse_genbank_text() {
        let record = parse_genbank_text("TEST0001", RECORD).unwrap();
        assert!(record.description.contains("tyrosine hydroxylase (Th)"));
        assert_eq!(record.sequence.len(), 40);
        assert!(record.sequence.starts_with("ACGTACGT"));
        assert_eq!(record.cds, Some(4..34));
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(matches!(
            parse_genbank_text("NM_0", ""),
            Err(ExternalError::EmptyRecord(_))
        ));
    }

    #[test]
    fn test_query_params_include_credentials() {
        let client =
            EntrezClient::new(Some("lab@example.org".to_string()), Some(String::new())).unwrap();
        let params = client.query_params("NM_009377");
        assert!(params.contains(&("id", "NM_009377")));
        assert!(params.contains(&("email", "lab@example.org")));
        assert!(!params.iter().any(|(key, _)| *key == "api_key"));
    }

    /// Serve `requests` connections with `RECORD`, noting when each arrives
    fn serve_records(requests: usize) -> (String, std::thread::JoinHandle<Vec<Instant>>) {
        use std::io::{BufRead, BufReader, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/efetch", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let mut arrivals = Vec::new();
            for stream in listener.incoming().take(requests) {
                let mut stream = stream.unwrap();
                arrivals.push(Instant::now());

                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                    line.clear();
                }

                write!(
                    stream,
                    "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    RECORD.len(),
                    RECORD
                )
                .unwrap();
            }
            arrivals
        });
        (url, handle)
    }

    fn gaps(arrivals: &[Instant]) -> Vec<Duration> {
        arrivals.windows(2).map(|w| w[1] - w[0]).collect()
    }

    #[test]
    fn test_requests_are_spaced_without_api_key() {
        let (url, server) = serve_records(4);
        let client = EntrezClient::new(None, None).unwrap().with_base_url(url);
        for _ in 0..4 {
            let description = client.fetch_description("TEST0001").unwrap();
            assert!(description.contains("(Th)"));
        }

        let arrivals = server.join().unwrap();
        assert_eq!(arrivals.len(), 4);
        for gap in gaps(&arrivals) {
            assert!(gap >= Duration::from_millis(300), "requests {gap:?} apart");
        }
    }

    #[test]
    fn test_api_key_allows_shorter_spacing() {
        let (url, server) = serve_records(3);
        let client = EntrezClient::new(None, Some("key".to_string()))
            .unwrap()
            .with_base_url(url);
        assert_eq!(client.min_interval(), MIN_INTERVAL_WITH_KEY);

        // A clone shares the limit of the client it came from
        let clone = client.clone();
        client.fetch_record("TEST0001").unwrap();
        clone.fetch_record("TEST0001").unwrap();
        client.fetch_record("TEST0001").unwrap();

        let arrivals = server.join().unwrap();
        for gap in gaps(&arrivals) {
            assert!(gap >= Duration::from_millis(80), "requests {gap:?} apart");
        }
    }
}
