use leaftrack_rs::{
    FrameSequence, LeafLinker, LeafSeries, LeafState, LinkTable, LinkerConfig, Mask, MaskBuilder,
    Rect, TrackingPipeline, TrackingReport,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn leaf(row: usize, col: usize, height: usize, width: usize) -> Mask {
    MaskBuilder::new(40, 40)
        .rect(Rect::new(row, col, height, width))
        .build()
}

fn track(masks: Vec<Vec<Mask>>, threshold: f64) -> (LinkTable, LeafSeries) {
    init_logging();
    let frames = FrameSequence::from_masks(masks).unwrap();
    let linker = LeafLinker::new(LinkerConfig::default().with_threshold(threshold)).unwrap();
    linker.track(&frames).unwrap()
}

#[test]
fn test_static_leaves() {
    let frame = vec![leaf(0, 0, 10, 10), leaf(20, 20, 10, 10)];
    let (table, series) = track(vec![frame.clone(), frame.clone(), frame], 0.2);

    for t in 0..2 {
        let w = table.similarity(t).unwrap();
        assert_eq!(w[[0, 0]], 1.0);
        assert_eq!(w[[1, 1]], 1.0);
        assert_eq!(w[[0, 1]], 0.0);
        assert_eq!(w[[1, 0]], 0.0);
        assert_eq!(table.link(t).unwrap(), &vec![Some(0), Some(1)]);
    }

    assert_eq!(series.num_identities(), 2);
    assert_eq!(series.emergences(1).len(), 0);
    assert_eq!(series.emergences(2).len(), 0);
    assert_eq!(series.trajectory(0).unwrap(), &vec![Some(0), Some(0), Some(0)]);
    assert_eq!(series.trajectory(1).unwrap(), &vec![Some(1), Some(1), Some(1)]);
}

#[test]
fn test_emergence() {
    // Leaf index 1 at frame 1 covers 90 of the original 100 pixels.
    let (table, series) = track(
        vec![
            vec![leaf(0, 0, 10, 10)],
            vec![leaf(25, 25, 6, 6), leaf(0, 0, 10, 9)],
        ],
        0.2,
    );

    let w = table.similarity(0).unwrap();
    assert!((w[[0, 1]] - 0.9).abs() < 1e-12);
    assert_eq!(w[[0, 0]], 0.0);
    assert_eq!(table.link(0).unwrap(), &vec![Some(1)]);

    assert_eq!(series.num_identities(), 2);
    let emerged = series.emergences(1);
    assert_eq!(emerged.len(), 1);
    assert_eq!(emerged[0].leaf, 0);
    assert_eq!(emerged[0].id, 1);

    assert_eq!(series.trajectory(0).unwrap(), &vec![Some(0), Some(1)]);
    assert_eq!(series.trajectory(1).unwrap(), &vec![None, Some(0)]);
    assert_eq!(series.track(1).unwrap().start_frame, 1);
}

#[test]
fn test_loss() {
    // At frame 2 the leaf has shifted so far its IoU is 10 / 190.
    let (table, series) = track(
        vec![
            vec![leaf(0, 0, 10, 10), leaf(20, 20, 10, 10)],
            vec![leaf(0, 0, 10, 10), leaf(20, 20, 10, 10)],
            vec![leaf(0, 9, 10, 10), leaf(20, 20, 10, 10)],
        ],
        0.2,
    );

    assert_eq!(table.link(1).unwrap(), &vec![None, Some(1)]);

    let lost = series.track(0).unwrap();
    assert_eq!(lost.trajectory, vec![Some(0), Some(0), None]);
    assert_eq!(lost.state_at(1), LeafState::Active);
    assert_eq!(lost.state_at(2), LeafState::Lost);
    assert_eq!(lost.last_frame(), Some(1));

    assert_eq!(series.trajectory(1).unwrap(), &vec![Some(1), Some(1), Some(1)]);
    assert_eq!(series.identity_at(2, 0), Some(2));

    let counts = series.frame_counts();
    assert_eq!(counts[2].lost, 1);
    assert_eq!(counts[2].emerged, 1);
    assert_eq!(counts[2].total, 2);
}

#[test]
fn test_threshold_boundary() {
    // 20 of 100 pixels: IoU is exactly 0.2.
    let (table, _) = track(
        vec![vec![leaf(0, 0, 10, 10)], vec![leaf(0, 0, 10, 2)]],
        0.2,
    );
    assert_eq!(table.similarity(0).unwrap()[[0, 0]], 0.2);
    assert_eq!(table.link(0).unwrap(), &vec![Some(0)]);

    // 19 of 100 pixels falls just below.
    let nineteen = MaskBuilder::new(40, 40)
        .rect(Rect::new(0, 0, 10, 1))
        .rect(Rect::new(0, 1, 9, 1))
        .build();
    let (table, series) = track(vec![vec![leaf(0, 0, 10, 10)], vec![nineteen]], 0.2);
    assert_eq!(table.link(0).unwrap(), &vec![None]);
    assert_eq!(series.num_identities(), 2);
}

#[test]
fn test_empty_next_frame_links_nothing() {
    let (table, series) = track(
        vec![vec![leaf(0, 0, 10, 10), leaf(20, 20, 5, 5)], vec![], vec![leaf(0, 0, 10, 10)]],
        0.2,
    );
    assert_eq!(table.link(0).unwrap(), &vec![None, None]);
    assert_eq!(table.similarity(0).unwrap().dim(), (2, 0));
    assert_eq!(table.link(1).unwrap(), &Vec::<Option<usize>>::new());
    assert_eq!(series.num_identities(), 3);
    assert_eq!(series.frame_counts()[1].total, 0);
    assert_eq!(series.frame_counts()[1].lost, 2);
}

#[test]
fn test_growing_leaves_keep_identity() {
    let frames = (0..5)
        .map(|t| {
            vec![
                leaf(0, 0, 6 + t, 6 + t),
                leaf(20, 20, 4 + t, 5 + t),
            ]
        })
        .collect();
    let (_, series) = track(frames, 0.2);
    assert_eq!(series.num_identities(), 2);
    for track in series.tracks() {
        assert_eq!(track.lifetime(), 5);
        assert_eq!(track.trajectory, vec![Some(track.id); 5]);
    }
}

#[test]
fn test_report_serializes() {
    init_logging();
    let mut pipeline = TrackingPipeline::with_default_config(NoSource);
    pipeline.push_masks(vec![leaf(0, 0, 10, 10)]);
    pipeline.push_masks(vec![leaf(0, 0, 10, 10), leaf(20, 20, 10, 10)]);
    let report = pipeline.finish().unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let restored: TrackingReport = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, report);
}

struct NoSource;

impl leaftrack_rs::MaskSource for NoSource {
    type Error = std::convert::Infallible;

    fn segment(&mut self, _input: &[u8], _width: u32, _height: u32) -> Result<Vec<Mask>, Self::Error> {
        Ok(vec![])
    }
}
