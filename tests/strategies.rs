extern crate mandelfarm;
extern crate rand;

use std::cell::Cell;
use std::thread;
use std::time::Duration;

use mandelfarm::comm::{group, Communicator, Endpoint, Rank, Source, Status, Tag, TagFilter};
use mandelfarm::error::CommError;
use mandelfarm::scheduler::{partition_columns, Strategy};
use mandelfarm::workunit::Task;
use mandelfarm::{render, render_with, Evaluator, MandelError, RenderConfig};
use rand::Rng;

const DISTRIBUTED: [Strategy; 3] = [
    Strategy::StaticFull,
    Strategy::StaticRoundBased,
    Strategy::Dynamic,
];

fn config(edge: usize) -> RenderConfig {
    RenderConfig {
        edge,
        color_depth: 96,
        ..RenderConfig::default()
    }
}

/// Wraps an endpoint and dawdles before every send.
struct Sluggish {
    inner: Endpoint,
    max_delay_us: u64,
}

impl Communicator for Sluggish {
    fn rank(&self) -> Rank {
        self.inner.rank()
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn send(&self, payload: &[i32], dest: Rank, tag: Tag) -> Result<(), CommError> {
        if self.max_delay_us > 0 {
            let delay = rand::thread_rng().gen_range(0, self.max_delay_us);
            thread::sleep(Duration::from_micros(delay));
        }
        self.inner.send(payload, dest, tag)
    }

    fn receive(
        &mut self,
        buffer: &mut [i32],
        source: Source,
        tag: TagFilter,
    ) -> Result<Status, CommError> {
        self.inner.receive(buffer, source, tag)
    }

    fn abort(&self) {
        self.inner.abort()
    }
}

/// Wraps an endpoint whose link breaks after a number of sends.
struct Flaky {
    inner: Endpoint,
    sends_left: Cell<Option<usize>>,
}

impl Communicator for Flaky {
    fn rank(&self) -> Rank {
        self.inner.rank()
    }

    fn size(&self) -> usize {
        self.inner.size()
    }

    fn send(&self, payload: &[i32], dest: Rank, tag: Tag) -> Result<(), CommError> {
        if let Some(left) = self.sends_left.get() {
            if left == 0 {
                return Err(CommError::Disconnected { rank: dest });
            }
            self.sends_left.set(Some(left - 1));
        }
        self.inner.send(payload, dest, tag)
    }

    fn receive(
        &mut self,
        buffer: &mut [i32],
        source: Source,
        tag: TagFilter,
    ) -> Result<Status, CommError> {
        self.inner.receive(buffer, source, tag)
    }

    fn abort(&self) {
        self.inner.abort()
    }
}

#[test]
fn every_strategy_draws_the_same_picture() {
    for edge in [1, 2, 7, 33].iter() {
        let config = config(*edge);
        let expected = Evaluator::new(&config).render();
        assert_eq!(
            render(Strategy::Sequential, 1, &config).unwrap().pixels,
            expected
        );
        for processes in [2, 3, 5, 9].iter() {
            for strategy in DISTRIBUTED.iter() {
                let report = render(*strategy, *processes, &config).unwrap();
                assert_eq!(
                    report.pixels, expected,
                    "{} with {} processes at edge {}",
                    strategy, processes, edge
                );
            }
        }
    }
}

#[test]
fn the_classic_view() {
    let config = RenderConfig::default();
    for strategy in DISTRIBUTED.iter() {
        let report = render(*strategy, 5, &config).unwrap();
        assert_eq!(report.workers, 4);
        assert_eq!(report.pixels.len(), 400 * 400);
        assert!(report.pixels[0] <= 5, "{}: corner is {}", strategy, report.pixels[0]);
        assert_eq!(report.pixels[200 * 400 + 200], 255, "{}", strategy);
        assert!(report.pixels.iter().all(|p| *p >= 1 && *p <= 255));
    }
}

#[test]
fn dynamic_hands_out_every_column_once() {
    for (edge, processes) in [(1, 2), (10, 2), (10, 4), (3, 8), (40, 6)].iter() {
        let report = render(Strategy::Dynamic, *processes, &config(*edge)).unwrap();
        let workers = processes - 1;

        let mut columns = report.dispatch.columns_assigned();
        assert_eq!(columns.len(), *edge);
        columns.sort();
        assert_eq!(columns, (0..*edge).collect::<Vec<_>>());
        assert!(report
            .dispatch
            .assignments
            .iter()
            .all(|a| a.task == Task::Column(a.task.columns().start)));

        let mut stopped = report.dispatch.stops.clone();
        stopped.sort();
        assert_eq!(stopped, (1..=workers).collect::<Vec<_>>());
        assert_eq!(report.dispatch.results, *edge);
    }
}

#[test]
fn round_based_deals_columns_in_order() {
    let report = render(Strategy::StaticRoundBased, 4, &config(7)).unwrap();
    let dealt: Vec<(Rank, usize)> = report
        .dispatch
        .assignments
        .iter()
        .map(|a| (a.worker, a.task.columns().start))
        .collect();
    assert_eq!(
        dealt,
        vec![(1, 0), (2, 1), (3, 2), (1, 3), (2, 4), (3, 5), (1, 6)]
    );
    assert_eq!(report.dispatch.stops, vec![1, 2, 3]);
    assert_eq!(report.dispatch.results, 7 * 7);
}

#[test]
fn static_full_sends_one_range_per_worker() {
    let report = render(Strategy::StaticFull, 4, &config(10)).unwrap();
    let ranges: Vec<Task> = report
        .dispatch
        .assignments
        .iter()
        .map(|a| a.task.clone())
        .collect();
    let expected: Vec<Task> = partition_columns(10, 3)
        .into_iter()
        .map(Task::Columns)
        .collect();
    assert_eq!(ranges, expected);
    assert!(report.dispatch.stops.is_empty());
    assert_eq!(report.dispatch.results, 100);

    let per_worker = report.columns_per_worker();
    assert_eq!(per_worker[&1], 4);
    assert_eq!(per_worker[&3], 2);
}

#[test]
fn uneven_workers_still_agree() {
    let config = config(24);
    let expected = Evaluator::new(&config).render();
    for strategy in DISTRIBUTED.iter() {
        let ranks: Vec<Sluggish> = group(4)
            .into_iter()
            .map(|inner| Sluggish {
                max_delay_us: if inner.rank() == 0 { 0 } else { 300 },
                inner,
            })
            .collect();
        let report = render_with(*strategy, ranks, &config).unwrap();
        assert_eq!(report.pixels, expected, "{}", strategy);
    }
}

#[test]
fn dynamic_gives_slow_workers_less() {
    let config = config(64);
    let ranks: Vec<Sluggish> = group(5)
        .into_iter()
        .map(|inner| Sluggish {
            max_delay_us: if inner.rank() == 1 { 40_000 } else { 0 },
            inner,
        })
        .collect();
    let report = render_with(Strategy::Dynamic, ranks, &config).unwrap();
    let per_worker = report.columns_per_worker();
    assert!(per_worker[&1] < 64 / 4, "slow worker took {:?}", per_worker);
    assert_eq!(per_worker.values().sum::<usize>(), 64);
}

#[test]
fn a_broken_link_fails_the_run_without_hanging() {
    for strategy in DISTRIBUTED.iter() {
        let ranks: Vec<Flaky> = group(4)
            .into_iter()
            .map(|inner| Flaky {
                sends_left: Cell::new(if inner.rank() == 2 { Some(0) } else { None }),
                inner,
            })
            .collect();
        match render_with(*strategy, ranks, &config(16)) {
            Err(MandelError::Comm(CommError::Disconnected { rank: 0 })) => {}
            Err(e) => panic!("{}: unexpected error {}", strategy, e),
            Ok(_) => panic!("{}: a broken link went unnoticed", strategy),
        }
    }
}
