//! Cumulative arc length along a segment list.

use thickline_render::{SegmentDistances, SegmentInstance};

/// Computes the arc distance at both ends of every instance.
///
/// Each instance starts where the previous one ended, regardless of whether
/// the segments actually touch. The first instance starts at 0.
pub fn line_distances(instances: &[SegmentInstance]) -> Vec<SegmentDistances> {
    let mut distances = Vec::with_capacity(instances.len());
    let mut travelled = 0.0_f32;
    for instance in instances {
        let start = travelled;
        travelled += instance.length();
        distances.push(SegmentDistances {
            start,
            end: travelled,
        });
    }
    distances
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_unit_segment() {
        let distances = line_distances(&[SegmentInstance::new(Vec3::ZERO, Vec3::X)]);
        assert_eq!(
            distances,
            vec![SegmentDistances {
                start: 0.0,
                end: 1.0
            }]
        );
    }

    #[test]
    fn test_disjoint_segments_accumulate() {
        let distances = line_distances(&[
            SegmentInstance::new(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0)),
            SegmentInstance::new(Vec3::splat(10.0), Vec3::new(10.0, 10.0, 12.0)),
        ]);
        assert_eq!(distances[0].end, 5.0);
        assert_eq!(distances[1].start, 5.0);
        assert_eq!(distances[1].end, 7.0);
    }

    #[test]
    fn test_empty() {
        assert!(line_distances(&[]).is_empty());
    }
}
