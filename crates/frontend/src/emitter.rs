//! Frame assembly

use contracts::{
    FrameError, FrameId, NormalizedImage, RigidTransform, SensorFrame, StereoCalibration,
    SyncGroup, Timestamp, TransformResolver,
};
use tracing::warn;

/// Builds one [`SensorFrame`] per accepted event.
///
/// Frames are numbered in emission order and never retained.
#[derive(Debug)]
pub struct FrameEmitter {
    reference_frame: FrameId,
    next_seq: u64,
    last_stamp: Option<Timestamp>,
    out_of_order: u64,
}

impl FrameEmitter {
    pub fn new(reference_frame: impl Into<FrameId>) -> Self {
        Self {
            reference_frame: reference_frame.into(),
            next_seq: 0,
            last_stamp: None,
            out_of_order: 0,
        }
    }

    pub fn reference_frame(&self) -> &FrameId {
        &self.reference_frame
    }

    /// Mounting pose of the left camera in the reference frame at the
    /// group's resolved stamp
    ///
    /// # Errors
    /// `MissingReferenceTransform` when the lookup has no answer
    pub fn local_transform<R: TransformResolver + ?Sized>(
        &self,
        group: &SyncGroup,
        transforms: &R,
    ) -> Result<RigidTransform, FrameError> {
        let stamp = group.resolved_stamp();
        let camera_frame = &group.left_image.header.frame_id;
        transforms
            .lookup(&self.reference_frame, camera_frame, stamp)
            .ok_or_else(|| FrameError::MissingReferenceTransform {
                reference_frame: self.reference_frame.clone(),
                camera_frame: camera_frame.clone(),
                stamp,
            })
    }

    pub fn emit(
        &mut self,
        group: &SyncGroup,
        calibration: StereoCalibration,
        left: NormalizedImage,
        right: NormalizedImage,
    ) -> SensorFrame {
        let stamp = group.resolved_stamp();
        if let Some(last) = self.last_stamp.filter(|last| stamp < *last) {
            self.out_of_order += 1;
            warn!(stamp = %stamp, last = %last, "emitted stamp went backwards");
        }
        self.last_stamp = Some(self.last_stamp.map_or(stamp, |last| last.max(stamp)));

        let seq = self.next_seq;
        self.next_seq += 1;

        SensorFrame {
            seq,
            stamp,
            frame_id: self.reference_frame.clone(),
            sensor_frame_id: group.sensor_frame_id().clone(),
            left,
            right,
            calibration,
        }
    }

    /// Frames emitted so far
    pub fn emitted(&self) -> u64 {
        self.next_seq
    }

    /// Frames whose stamp was older than an earlier frame
    pub fn out_of_order(&self) -> u64 {
        self.out_of_order
    }
}
