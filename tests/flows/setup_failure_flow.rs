use ferrous_dnsperf_domain::DomainError;
use ferrous_dnsperf_infrastructure::corpus_loader::CorpusLoader;
use ferrous_dnsperf_tests::LoadTestBuilder;
use std::io::Write;
use std::net::SocketAddr;
use tempfile::NamedTempFile;

fn unused_addr() -> SocketAddr {
    "127.0.0.1:9".parse().unwrap()
}

#[test]
fn test_unknown_qtype_aborts_before_run() {
    let result = LoadTestBuilder::new(unused_addr())
        .corpus("example.com A\nexample.com WHAT\n")
        .run();

    assert!(matches!(
        result,
        Err(DomainError::UnknownQueryType { line: 2, .. })
    ));
}

#[test]
fn test_overlong_domain_aborts_before_run() {
    let domain = format!("{}.example", "a".repeat(250));
    let result = LoadTestBuilder::new(unused_addr())
        .corpus(&format!("{} A\n", domain))
        .run();

    assert!(matches!(result, Err(DomainError::DomainTooLong { .. })));
}

#[test]
fn test_corpus_file_feeds_a_run() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# one query").unwrap();
    writeln!(file, "a.test A").unwrap();

    let corpus = CorpusLoader::load(file.path()).unwrap();

    assert_eq!(corpus.len(), 1);
    assert_eq!(&*corpus.get(0).unwrap().domain, "a.test");
}
