//! Tests for sync::Cursor driven by in-memory fetchers.

use std::collections::VecDeque;

use zero_cursor::sync::Cursor;
use zero_cursor::{
    Batch, BatchFetcher, Datum, Error, Opts, QueryToken, ReplayFetcher, Response, ResponseType,
    Result, impl_from_datum,
};

/// Fetcher that plays back a script of batches and errors, recording calls.
#[derive(Default)]
struct Scripted {
    steps: VecDeque<Result<Batch>>,
    fetches: usize,
    abandons: usize,
    fail_abandon: bool,
    hints: Vec<Vec<(&'static str, Datum)>>,
}

impl Scripted {
    fn new(steps: impl IntoIterator<Item = Result<Batch>>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl BatchFetcher for Scripted {
    fn fetch_next(&mut self, token: QueryToken, opts: &Opts) -> Result<Batch> {
        assert_eq!(token, QueryToken(42), "fetch for the wrong query");
        self.fetches += 1;
        self.hints.push(opts.batch_optargs());
        self.steps
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected fetch #{}", self.fetches))
    }

    fn abandon(&mut self, token: QueryToken) -> Result<()> {
        assert_eq!(token, QueryToken(42), "abandon for the wrong query");
        self.abandons += 1;
        if self.fail_abandon {
            return Err(Error::Protocol("connection closed".into()));
        }
        Ok(())
    }
}

fn ints(range: std::ops::Range<i32>) -> Vec<Datum> {
    range.map(Datum::from).collect()
}

/// Split `0..total` into consecutive batches of the given sizes.
fn batches(sizes: &[usize]) -> Vec<Batch> {
    let mut next = 0;
    let last = sizes.len() - 1;
    sizes
        .iter()
        .enumerate()
        .map(|(idx, size)| {
            let rows: Vec<Datum> = (next..next + size).map(|n| Datum::from(n as i32)).collect();
            next += size;
            if idx == last {
                Batch::last(rows)
            } else {
                Batch::partial(rows)
            }
        })
        .collect()
}

fn drain(cursor: &mut Cursor<impl BatchFetcher>) -> Vec<i32> {
    let mut out = Vec::new();
    while cursor.next() {
        out.push(cursor.scan::<i32>().unwrap());
    }
    out
}

#[test]
fn test_three_rows_then_exhausted() {
    let rows = vec![Datum::from("A"), Datum::from("B"), Datum::from("C")];
    let mut cursor = Cursor::with_first_batch(
        Scripted::default(),
        QueryToken(42),
        Batch::last(rows),
        Opts::default(),
    );

    for expected in ["A", "B", "C"] {
        assert!(cursor.next());
        assert_eq!(cursor.scan::<String>().unwrap(), expected);
    }
    assert!(!cursor.next());
    assert!(cursor.err().is_none());
    assert!(cursor.is_closed());
    assert_eq!(cursor.fetcher().fetches, 0);

    // Natural exhaustion leaves nothing to stop on the server.
    cursor.close().unwrap();
    assert_eq!(cursor.fetcher().abandons, 0);
}

#[test]
fn test_rows_concatenate_across_batches() {
    let layouts: &[&[usize]] = &[
        &[3, 1, 5, 0, 2],
        &[0, 0, 4],
        &[1, 1, 1, 1],
        &[5, 0],
        &[0],
        &[2, 0, 0, 0, 3, 0],
        &[7, 3, 1, 0, 9, 2, 2],
    ];

    for sizes in layouts {
        let total: usize = sizes.iter().sum();
        let mut all = batches(sizes);
        let first = all.remove(0);
        let mut cursor = Cursor::with_first_batch(
            Scripted::new(all.into_iter().map(Ok)),
            QueryToken(42),
            first,
            Opts::default(),
        );

        let seen = drain(&mut cursor);
        let expected: Vec<i32> = (0..total as i32).collect();
        assert_eq!(seen, expected, "batch sizes {:?}", sizes);
        assert!(cursor.err().is_none());
        assert_eq!(cursor.fetcher().fetches, sizes.len() - 1);
        assert!(cursor.fetcher().steps.is_empty());
    }
}

#[test]
fn test_lazy_first_fetch() {
    let fetcher = ReplayFetcher::new(batches(&[2, 3]));
    let mut cursor = Cursor::new(fetcher, QueryToken(9), Opts::default());
    assert_eq!(cursor.buffered(), 0);
    assert_eq!(cursor.fetcher().fetches(), 0);

    assert!(cursor.next());
    assert_eq!(cursor.fetcher().fetches(), 1);
    assert_eq!(cursor.buffered(), 1);
    assert_eq!(drain(&mut cursor), vec![1, 2, 3, 4]);
    assert_eq!(cursor.fetcher().fetches(), 2);
}

#[test]
fn test_one_fetch_per_exhausted_window() {
    let mut cursor = Cursor::with_first_batch(
        Scripted::new([Ok(Batch::partial(ints(2..4))), Ok(Batch::last(ints(4..5)))]),
        QueryToken(42),
        Batch::partial(ints(0..2)),
        Opts::default(),
    );
    assert!(cursor.next());
    assert!(cursor.next());
    assert_eq!(cursor.fetcher().fetches, 0);
    assert!(cursor.next());
    assert_eq!(cursor.fetcher().fetches, 1);
    assert!(cursor.next());
    assert_eq!(cursor.fetcher().fetches, 1);
    assert!(cursor.next());
    assert_eq!(cursor.fetcher().fetches, 2);
    assert!(!cursor.next());
    assert_eq!(cursor.fetcher().fetches, 2);
}

#[test]
fn test_close_is_idempotent() {
    let mut cursor = Cursor::with_first_batch(
        Scripted::default(),
        QueryToken(42),
        Batch::partial(ints(0..3)),
        Opts::default(),
    );
    assert!(cursor.next());
    for _ in 0..3 {
        cursor.close().unwrap();
        assert!(cursor.is_closed());
        assert!(!cursor.next());
        assert!(cursor.err().is_none());
    }
    assert_eq!(cursor.fetcher().abandons, 1);
    assert_eq!(cursor.fetcher().fetches, 0);
}

#[test]
fn test_close_reports_abandon_failure() {
    let fetcher = Scripted {
        fail_abandon: true,
        ..Default::default()
    };
    let mut cursor =
        Cursor::with_first_batch(fetcher, QueryToken(42), Batch::partial(ints(0..1)), Opts::default());

    assert!(matches!(cursor.close(), Err(Error::Protocol(_))));
    assert!(cursor.is_closed());
    cursor.close().unwrap();
    assert_eq!(cursor.fetcher().abandons, 1);
}

#[test]
fn test_fetch_failure_is_sticky() {
    let mut cursor = Cursor::with_first_batch(
        Scripted::new([Err(Error::Protocol("connection reset".into()))]),
        QueryToken(42),
        Batch::partial(ints(0..1)),
        Opts::default(),
    );

    assert!(cursor.next());
    assert_eq!(cursor.scan::<i32>().unwrap(), 0);
    for _ in 0..3 {
        assert!(!cursor.next());
        match cursor.err() {
            Some(Error::Protocol(msg)) => assert_eq!(msg, "connection reset"),
            other => panic!("unexpected error state: {:?}", other),
        }
    }
    assert_eq!(cursor.fetcher().fetches, 1);
    assert!(matches!(cursor.scan::<i32>(), Err(Error::NotPositioned)));

    // Closing keeps the failure and does not touch the server.
    cursor.close().unwrap();
    assert!(cursor.err().is_some());
    assert_eq!(cursor.fetcher().abandons, 0);
}

#[test]
fn test_server_error_from_fetch() {
    let response = Response {
        token: QueryToken(42),
        response_type: ResponseType::RuntimeError,
        results: vec![Datum::from("Table `test.heroes` does not exist.")],
        backtrace: None,
    };
    let mut cursor = Cursor::new(
        Scripted::new([response.into_batch()]),
        QueryToken(42),
        Opts::default(),
    );
    assert!(!cursor.next());
    let err = cursor.err().unwrap();
    assert!(err.is_fetch_failure());
    assert_eq!(
        err.server_error().unwrap().message,
        "Table `test.heroes` does not exist."
    );
}

#[test]
fn test_scan_not_positioned_and_closed() {
    let mut cursor = Cursor::with_first_batch(
        Scripted::default(),
        QueryToken(42),
        Batch::partial(ints(0..2)),
        Opts::default(),
    );
    assert!(matches!(cursor.scan::<i32>(), Err(Error::NotPositioned)));
    assert!(cursor.current().is_none());

    assert!(cursor.next());
    assert_eq!(cursor.current(), Some(&Datum::from(0)));
    cursor.close().unwrap();
    assert!(matches!(cursor.scan::<i32>(), Err(Error::Closed)));
    assert!(cursor.current().is_none());
}

#[test]
fn test_scan_after_exhaustion_is_closed() {
    let mut cursor = Cursor::with_first_batch(
        Scripted::default(),
        QueryToken(42),
        Batch::last(ints(0..1)),
        Opts::default(),
    );
    assert!(cursor.next());
    assert!(!cursor.next());
    assert!(matches!(cursor.scan::<i32>(), Err(Error::Closed)));
}

#[test]
fn test_decode_failure_does_not_poison() {
    let rows = vec![Datum::from(1), Datum::from("two"), Datum::from(3)];
    let mut cursor =
        Cursor::with_first_batch(Scripted::default(), QueryToken(42), Batch::last(rows), Opts::default());

    assert!(cursor.next());
    assert_eq!(cursor.scan::<i64>().unwrap(), 1);
    assert!(cursor.next());
    assert!(matches!(cursor.scan::<i64>(), Err(Error::Decode(_))));
    assert_eq!(cursor.scan::<String>().unwrap(), "two");
    assert!(cursor.err().is_none());
    assert!(cursor.next());
    let mut dest = 0_i64;
    cursor.scan_into(&mut dest).unwrap();
    assert_eq!(dest, 3);
}

#[test]
fn test_null_rows_are_rows() {
    let rows = vec![Datum::Null, Datum::from(1), Datum::Null];
    let mut cursor =
        Cursor::with_first_batch(Scripted::default(), QueryToken(42), Batch::last(rows), Opts::default());
    let values: Vec<Option<i32>> = cursor.all().unwrap();
    assert_eq!(values, vec![None, Some(1), None]);
}

#[derive(Debug, PartialEq)]
struct Stats {
    wins: u32,
}
impl_from_datum!(Stats { wins });

#[derive(Debug, PartialEq)]
struct Hero {
    id: String,
    name: String,
    stats: Stats,
}
impl_from_datum!(Hero { id, name => "display_name", stats });

fn hero(id: &str, name: &str, wins: u32) -> Datum {
    [
        ("id", Datum::from(id)),
        ("display_name", Datum::from(name)),
        ("stats", [("wins", wins)].into_iter().collect::<Datum>()),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_all_decodes_records() {
    let mut cursor = Cursor::with_first_batch(
        Scripted::new([Ok(Batch::last(vec![hero("h2", "Tarn", 1)]))]),
        QueryToken(42),
        Batch::partial(vec![hero("h1", "Wren", 4)]),
        Opts::default(),
    );

    let heroes: Vec<Hero> = cursor.all().unwrap();
    assert_eq!(
        heroes,
        vec![
            Hero {
                id: "h1".into(),
                name: "Wren".into(),
                stats: Stats { wins: 4 },
            },
            Hero {
                id: "h2".into(),
                name: "Tarn".into(),
                stats: Stats { wins: 1 },
            },
        ]
    );
    // Draining does not close explicitly; exhaustion did.
    assert!(cursor.is_closed());
    assert_eq!(cursor.fetcher().abandons, 0);
}

#[test]
fn test_all_datums() {
    let mut cursor = Cursor::with_first_batch(
        Scripted::default(),
        QueryToken(42),
        Batch::last(vec![hero("h1", "Wren", 4), Datum::Null]),
        Opts::default(),
    );
    let rows = cursor.all_datums().unwrap();
    assert_eq!(rows, vec![hero("h1", "Wren", 4), Datum::Null]);
}

#[test]
fn test_collect_into_keeps_rows_before_decode_error() {
    let rows = vec![Datum::from(1), Datum::from(2), Datum::from(false), Datum::from(4)];
    let mut cursor =
        Cursor::with_first_batch(Scripted::default(), QueryToken(42), Batch::last(rows), Opts::default());

    let mut out: Vec<i32> = Vec::new();
    let err = cursor.collect_into(&mut out).unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
    assert_eq!(out, vec![1, 2]);

    // The cursor is still usable after a decode error.
    assert!(cursor.next());
    assert_eq!(cursor.scan::<i32>().unwrap(), 4);
}

#[test]
fn test_all_reports_fetch_failure() {
    let mut cursor = Cursor::with_first_batch(
        Scripted::new([Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "eof",
        )))]),
        QueryToken(42),
        Batch::partial(ints(0..2)),
        Opts::default(),
    );

    let mut out: Vec<i32> = Vec::new();
    let err = cursor.collect_into(&mut out).unwrap_err();
    assert!(matches!(err, Error::Failed(_)));
    assert!(err.is_fetch_failure());
    assert_eq!(out, vec![0, 1]);
    assert!(matches!(cursor.err(), Some(Error::Io(_))));
}

#[test]
fn test_rows_iterator() {
    let mut all = batches(&[2, 0, 3]);
    let first = all.remove(0);
    let mut cursor = Cursor::with_first_batch(
        Scripted::new(all.into_iter().map(Ok)),
        QueryToken(42),
        first,
        Opts::default(),
    );
    let values: Vec<i32> = cursor.rows::<i32>().collect::<Result<_>>().unwrap();
    assert_eq!(values, vec![0, 1, 2, 3, 4]);
    assert_eq!(cursor.rows::<i32>().count(), 0);
}

#[test]
fn test_rows_iterator_yields_fetch_failure_once() {
    let mut cursor = Cursor::with_first_batch(
        Scripted::new([Err(Error::Protocol("bad frame".into()))]),
        QueryToken(42),
        Batch::partial(ints(0..1)),
        Opts::default(),
    );
    let items: Vec<Result<i32>> = cursor.rows().collect();
    assert_eq!(items.len(), 2);
    assert_eq!(*items[0].as_ref().unwrap(), 0);
    assert!(matches!(items[1], Err(Error::Failed(_))));
}

#[test]
fn test_drop_stops_live_query() {
    let mut fetcher = Scripted::default();
    {
        let mut cursor = Cursor::with_first_batch(
            &mut fetcher,
            QueryToken(42),
            Batch::partial(ints(0..3)),
            Opts::default(),
        );
        assert!(cursor.next());
    }
    assert_eq!(fetcher.abandons, 1);

    let opts = Opts {
        close_on_drop: false,
        ..Opts::default()
    };
    {
        let _cursor =
            Cursor::with_first_batch(&mut fetcher, QueryToken(42), Batch::partial(ints(0..3)), opts);
    }
    assert_eq!(fetcher.abandons, 1);

    {
        let _cursor = Cursor::with_first_batch(
            &mut fetcher,
            QueryToken(42),
            Batch::last(ints(0..3)),
            Opts::default(),
        );
    }
    assert_eq!(fetcher.abandons, 1);
}

#[test]
fn test_batch_hints_reach_fetcher() {
    let opts = Opts::try_from("rethinkdb://localhost/test?max_batch_rows=2").unwrap();
    let mut cursor = Cursor::new(
        Scripted::new([Ok(Batch::partial(ints(0..2))), Ok(Batch::last(ints(2..3)))]),
        QueryToken(42),
        opts,
    );
    assert_eq!(drain(&mut cursor), vec![0, 1, 2]);
    let hints = &cursor.fetcher().hints;
    assert_eq!(hints.len(), 2);
    assert_eq!(hints[0], vec![("max_batch_rows", Datum::Number(2.0))]);
}

#[test]
fn test_from_response() {
    let response = Response {
        token: QueryToken(42),
        response_type: ResponseType::SuccessPartial,
        results: ints(0..2),
        backtrace: None,
    };
    let mut cursor = Cursor::from_response(
        Scripted::new([Ok(Batch::last(ints(2..3)))]),
        response,
        Opts::default(),
    )
    .unwrap();
    assert_eq!(cursor.token(), QueryToken(42));
    assert!(!cursor.is_exhausted());
    assert_eq!(drain(&mut cursor), vec![0, 1, 2]);
    assert!(cursor.is_exhausted());

    let response = Response {
        token: QueryToken(42),
        response_type: ResponseType::CompileError,
        results: vec![Datum::from("Expected 1 argument but found 2.")],
        backtrace: None,
    };
    let err = Cursor::from_response(Scripted::default(), response, Opts::default()).unwrap_err();
    assert!(matches!(err, Error::Server(_)));
}
