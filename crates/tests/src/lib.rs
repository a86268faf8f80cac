//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置快照测试
//! - 合成立体相机驱动的 e2e 测试（配置 → 前端 → 分发 → 文件）
//! - 同步策略、暂停与标定路径的跨 crate 行为

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{IngestBlueprint, SyncPolicy};

    #[test]
    fn test_default_blueprint_round_trips() {
        let toml = ConfigLoader::to_toml(&IngestBlueprint::default()).unwrap();
        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        assert_eq!(blueprint.frontend.sync_policy(), SyncPolicy::Exact);
        assert_eq!(blueprint.frontend.frame_id, "base_link");
        assert!(blueprint.frontend.already_rectified);
        assert!(blueprint.sinks.is_empty());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use calibration::StaticTransformTree;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        FrameHandoff, IngestBlueprint, NormalizedEncoding, SensorFrame, SyncSettings,
    };
    use dispatcher::{create_dispatcher, ChannelHandoff};
    use frontend::StereoFrontend;
    use ingestion::{
        BackpressureConfig, DropPolicy, IngestionMetrics, MockStereoRig, RigMode,
        StereoEventGenerator,
    };
    use observability::FrameMetricsAggregator;

    const RIG_TOML: &str = r#"
[frontend]
frame_id = "base_link"

[[transforms]]
parent = "base_link"
child = "left_camera"
location = { x = 0.2, y = 0.06, z = 1.1 }
rotation = { roll = -90.0, pitch = 0.0, yaw = -90.0 }

[source]
width = 16
height = 8
rate_hz = 20.0
"#;

    fn blueprint() -> IngestBlueprint {
        ConfigLoader::load_from_str(RIG_TOML, ConfigFormat::Toml).unwrap()
    }

    fn frontend(blueprint: &IngestBlueprint) -> StereoFrontend<StaticTransformTree> {
        StereoFrontend::new(
            blueprint.frontend.clone(),
            StaticTransformTree::from_configs(&blueprint.transforms),
        )
    }

    /// 用确定性生成器驱动前端，收集产出的帧
    fn drive(
        frontend: &mut StereoFrontend<StaticTransformTree>,
        generator: &mut StereoEventGenerator,
        ticks: usize,
    ) -> Vec<SensorFrame> {
        let mode = if frontend.config().subscribe_rgbd {
            RigMode::Packed
        } else {
            RigMode::FourStream
        };
        (0..ticks)
            .flat_map(|_| generator.next_events(mode))
            .filter_map(|event| frontend.process(event))
            .collect()
    }

    /// End-to-end test: MockStereoRig -> StereoFrontend -> Dispatcher -> FileSink
    ///
    /// 验证完整的数据流：
    /// 1. 配置文本解析为 IngestBlueprint
    /// 2. MockStereoRig 生成四路消息
    /// 3. StereoFrontend 同步并产出 SensorFrame
    /// 4. Dispatcher 将帧写入文件 sink
    #[tokio::test]
    async fn test_e2e_four_stream_to_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let toml = format!(
            "{RIG_TOML}\n[[sinks]]\nname = \"disk\"\nsink_type = \"file\"\n\
             [sinks.params]\nbase_path = \"{}\"\n",
            dir.path().display()
        );
        let mut blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        blueprint.source.rate_hz = 200.0;
        blueprint.source.max_events = Some(6);

        let mut frontend = frontend(&blueprint);
        let (mut handoff, frames_rx) = ChannelHandoff::channel(32);
        let dispatcher = create_dispatcher(blueprint.sinks.clone(), frames_rx).unwrap();
        let dispatcher_handle = dispatcher.spawn();

        let metrics = Arc::new(IngestionMetrics::new());
        let rig = MockStereoRig::new(blueprint.source.clone(), RigMode::FourStream).with_seed(3);
        let events = rig
            .start(
                BackpressureConfig::new(64, DropPolicy::DropOldest),
                Some(Arc::clone(&metrics)),
            )
            .unwrap();

        let consume = async {
            while let Ok(event) = events.recv().await {
                frontend.dispatch(event, &mut handoff);
            }
        };
        tokio::time::timeout(Duration::from_secs(5), consume)
            .await
            .expect("rig should be exhausted");

        assert_eq!(frontend.stats().frames_emitted, 6);
        assert_eq!(frontend.stats().events, 24);
        assert_eq!(metrics.snapshot().events_dropped, 0);
        assert_eq!(handoff.dropped(), 0);

        drop(handoff);
        let sinks = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle)
            .await
            .expect("dispatcher should drain")
            .unwrap();
        assert_eq!(sinks.len(), 1);
        assert_eq!(sinks[0].0, "disk");
        assert_eq!(sinks[0].1.written, 6);
        assert_eq!(sinks[0].1.last_seq, Some(5));

        for seq in 0..6 {
            assert!(dir.path().join(format!("left/{seq:06}.png")).exists());
            assert!(dir.path().join(format!("right/{seq:06}.png")).exists());
        }
        let right = image::open(dir.path().join("right/000000.png")).unwrap();
        assert_eq!(right.color(), image::ColorType::L8);
        assert_eq!((right.width(), right.height()), (16, 8));

        let json = std::fs::read_to_string(dir.path().join("calibration/000005.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["frame_id"], "base_link");
        assert_eq!(value["sensor_frame_id"], "left_camera");
        assert_eq!(value["calibration"]["rectified"], true);
        let baseline = value["calibration"]["baseline"].as_f64().unwrap();
        assert!((baseline - 0.12).abs() < 1e-9);

        let times = std::fs::read_to_string(dir.path().join("times.txt")).unwrap();
        assert_eq!(times.lines().count(), 6);
    }

    #[test]
    fn test_e2e_packed_keep_color() {
        let mut blueprint = blueprint();
        blueprint.frontend.subscribe_rgbd = true;
        blueprint.frontend.keep_color = true;
        blueprint.source.encoding = "bgr8".into();

        let mut frontend = frontend(&blueprint);
        let mut generator = StereoEventGenerator::new(blueprint.source.clone(), 1);
        let frames = drive(&mut frontend, &mut generator, 5);

        assert_eq!(frames.len(), 5);
        assert!(frontend.sync_stats().is_none());
        for (expected_seq, frame) in frames.iter().enumerate() {
            assert_eq!(frame.seq, expected_seq as u64);
            assert_eq!(frame.sensor_frame_id, "stereo_camera");
            assert_eq!(frame.left.encoding, NormalizedEncoding::Bgr8);
            assert_eq!(frame.left.data.len(), 16 * 8 * 3);
            assert_eq!(frame.right.encoding, NormalizedEncoding::Mono8);
            assert_eq!(frame.right.data.len(), 16 * 8);
        }

        let mut aggregator = FrameMetricsAggregator::new();
        frames.iter().for_each(|frame| aggregator.update(frame));
        let summary = aggregator.summary();
        assert_eq!(summary.total_frames, 5);
        assert_eq!(summary.sequence_gaps, 0);
        assert!((summary.frame_interval_ms.mean - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_e2e_approximate_sync_with_jitter() {
        let mut blueprint = blueprint();
        blueprint.frontend.approx_sync = true;
        blueprint.frontend.approx_sync_max_interval = 0.01;
        blueprint.source.jitter_ms = 3.0;

        let mut frontend = frontend(&blueprint);
        let mut generator = StereoEventGenerator::new(blueprint.source.clone(), 11);
        let frames = drive(&mut frontend, &mut generator, 20);

        // 最后一组可能仍在等待后续消息确认
        assert!(frames.len() >= 19, "only {} frames", frames.len());
        assert!(frames.len() <= 20);
        assert!(frames
            .windows(2)
            .all(|pair| pair[0].stamp.as_nanos() < pair[1].stamp.as_nanos()));
        assert!(frames
            .iter()
            .enumerate()
            .all(|(i, frame)| frame.seq == i as u64));
        assert_eq!(frontend.stats().frames_dropped, 0);
    }

    #[test]
    fn test_e2e_exact_sync_rejects_jittered_stamps() {
        let mut blueprint = blueprint();
        blueprint.source.jitter_ms = 3.0;

        let mut frontend = frontend(&blueprint);
        let mut generator = StereoEventGenerator::new(blueprint.source.clone(), 11);
        let frames = drive(&mut frontend, &mut generator, 10);

        assert!(frames.is_empty());
        assert_eq!(frontend.stats().groups, 0);
        assert_eq!(frontend.stats().events, 40);
    }

    #[test]
    fn test_e2e_pause_and_resume() {
        let blueprint = blueprint();
        let mut frontend = frontend(&blueprint);
        let mut generator = StereoEventGenerator::new(blueprint.source.clone(), 5);

        frontend.pause();
        assert!(drive(&mut frontend, &mut generator, 3).is_empty());
        assert_eq!(frontend.stats().paused_drops, 3);

        frontend.resume();
        let frames = drive(&mut frontend, &mut generator, 3);
        let seqs: Vec<u64> = frames.iter().map(|frame| frame.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(frontend.stats().groups, 6);
    }

    #[test]
    fn test_e2e_reconfigure_between_events() {
        let blueprint = blueprint();
        let mut frontend = frontend(&blueprint);
        let mut generator = StereoEventGenerator::new(blueprint.source.clone(), 5);

        assert_eq!(drive(&mut frontend, &mut generator, 2).len(), 2);

        frontend.reconfigure(
            SyncSettings::approximate(10).with_max_interval(Duration::from_millis(20)),
        );
        assert!(frontend.config().approx_sync);

        let frames = drive(&mut frontend, &mut generator, 2);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].seq, 2);
        assert_eq!(frontend.sync_stats().unwrap().queue_size, 10);
    }

    #[test]
    fn test_e2e_unrectified_uses_camera_transform() {
        let toml = format!(
            "{RIG_TOML}\n[[transforms]]\nparent = \"left_camera\"\nchild = \"right_camera\"\n\
             location = {{ x = 0.12, y = 0.0, z = 0.0 }}\n"
        );
        let mut blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        blueprint.frontend.already_rectified = false;

        let mut frontend = frontend(&blueprint);
        let mut generator = StereoEventGenerator::new(blueprint.source.clone(), 2);
        let frames = drive(&mut frontend, &mut generator, 3);

        assert_eq!(frames.len(), 3);
        for frame in &frames {
            assert!(!frame.calibration.rectified);
            assert!(frame.calibration.extrinsics.is_some());
            assert!((frame.calibration.baseline - 0.12).abs() < 1e-9);
        }
    }

    #[test]
    fn test_e2e_unrectified_without_camera_transform_drops() {
        let mut blueprint = blueprint();
        blueprint.frontend.already_rectified = false;

        let mut frontend = frontend(&blueprint);
        let mut generator = StereoEventGenerator::new(blueprint.source.clone(), 2);

        assert!(drive(&mut frontend, &mut generator, 3).is_empty());
        assert_eq!(frontend.stats().groups, 3);
        assert_eq!(frontend.stats().frames_dropped, 3);
    }

    #[test]
    fn test_e2e_missing_reference_transform_drops() {
        let mut blueprint = blueprint();
        blueprint.transforms.clear();

        let mut frontend = frontend(&blueprint);
        let mut generator = StereoEventGenerator::new(blueprint.source.clone(), 2);

        assert!(drive(&mut frontend, &mut generator, 2).is_empty());
        assert_eq!(frontend.stats().frames_dropped, 2);
        assert_eq!(frontend.emitter().emitted(), 0);
    }

    #[test]
    fn test_e2e_handoff_drops_when_dispatcher_lags() {
        let blueprint = blueprint();
        let mut frontend = frontend(&blueprint);
        let mut generator = StereoEventGenerator::new(blueprint.source.clone(), 9);
        let (mut handoff, mut frames_rx) = ChannelHandoff::channel(2);

        for frame in drive(&mut frontend, &mut generator, 4) {
            handoff.hand_off(frame);
        }

        assert_eq!(handoff.dropped(), 2);
        assert_eq!(frames_rx.try_recv().unwrap().seq, 0);
        assert_eq!(frames_rx.try_recv().unwrap().seq, 1);
        assert!(frames_rx.try_recv().is_err());
    }
}
