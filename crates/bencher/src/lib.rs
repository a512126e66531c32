use std::fmt::Write;

#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    archive: TestArchive,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, archive: TestArchive) -> Self {
        Self { name, group, archive }
    }

    pub fn small(name: &'static str, archive: TestArchive) -> Self {
        Self::new(name, TestGroup::Small, archive)
    }

    pub fn normal(name: &'static str, archive: TestArchive) -> Self {
        Self::new(name, TestGroup::Normal, archive)
    }

    pub fn large(name: &'static str, archive: TestArchive) -> Self {
        Self::new(name, TestGroup::Large, archive)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn archive(&self) -> &TestArchive {
        &self.archive
    }
}

/// Shape of a generated archive: `records` request/response pairs with `body_size` byte bodies.
#[derive(Debug, Copy, Clone)]
pub struct TestArchive {
    records: usize,
    body_size: usize,
}

impl TestArchive {
    pub const fn new(records: usize, body_size: usize) -> Self {
        Self { records, body_size }
    }

    pub fn records(&self) -> usize {
        self.records
    }

    /// Renders the archive: a `warcinfo` record followed by request/response pairs.
    pub fn content(&self) -> Vec<u8> {
        let mut archive = String::new();
        push_record(&mut archive, "warcinfo", 0, "software: bencher\r\nformat: WARC File Format 1.0\r\n");

        let body = "x".repeat(self.body_size);
        for id in 1..=self.records {
            let request = format!(
                "GET /page/{id} HTTP/1.1\r\nHost: example.com\r\nUser-Agent: bencher/0.0\r\nAccept: text/html\r\n\r\n"
            );
            push_record(&mut archive, "request", id, &request);

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nServer: bencher\r\n\r\n{body}",
                body.len()
            );
            push_record(&mut archive, "response", id, &response);
        }

        archive.into_bytes()
    }
}

fn push_record(archive: &mut String, record_type: &str, id: usize, content: &str) {
    let _ = write!(
        archive,
        "WARC/1.0\r\nWARC-Type: {record_type}\r\nWARC-Record-ID: <urn:uuid:00000000-0000-0000-0000-{id:012}>\r\n\
         WARC-Target-URI: http://example.com/page/{id}\r\nWARC-Date: 2024-01-01T00:00:00Z\r\n\
         Content-Type: application/http\r\nContent-Length: {}\r\n\r\n{content}\r\n\r\n",
        content.len()
    );
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}
