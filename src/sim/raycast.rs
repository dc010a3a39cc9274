//! Grid ray casting for the simulated rangers

use super::course::VirtualCourse;
use super::grid::{Cell, Heading};

/// Distance from `origin` to the first wall along `direction`
///
/// Steps one cell at a time for at most `max_range` steps. A ray that hits
/// nothing reports the distance to where it stopped.
pub fn ray_cast(course: &VirtualCourse, origin: Cell, direction: Heading, max_range: u32) -> u32 {
    let mut cell = origin;
    for _ in 0..max_range {
        if course.is_wall(cell) {
            break;
        }
        cell = cell.advance(direction, 1);
    }
    origin.distance_to(cell)
}

/// Readings of the three rangers for one pose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeScan {
    pub left: u32,
    pub front: u32,
    pub right: u32,
}

/// Ranger geometry
#[derive(Debug, Clone, Copy)]
pub struct RangerLayout {
    /// Cells ahead where the side rays start
    pub look_ahead: i32,
    /// Look-ahead on diagonal headings
    pub diagonal_look_ahead: i32,
    pub max_range: u32,
}

impl RangerLayout {
    /// Point ahead of the vehicle that the side rangers measure from
    pub fn look_ahead_point(&self, position: Cell, heading: Heading) -> Cell {
        let n = if heading.is_diagonal() {
            self.diagonal_look_ahead
        } else {
            self.look_ahead
        };
        position.advance(heading, n)
    }

    /// Cast the side rays from the look-ahead point and the front ray from
    /// the vehicle itself
    pub fn scan(&self, course: &VirtualCourse, position: Cell, heading: Heading) -> RangeScan {
        let probe = self.look_ahead_point(position, heading);
        RangeScan {
            left: ray_cast(course, probe, heading.rotate(2), self.max_range),
            front: ray_cast(course, position, heading, self.max_range),
            right: ray_cast(course, probe, heading.rotate(-2), self.max_range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::course::CourseTemplate;

    fn layout() -> RangerLayout {
        RangerLayout {
            look_ahead: 10,
            diagonal_look_ahead: 7,
            max_range: 80,
        }
    }

    #[test]
    fn test_side_rays_in_straight_corridor() {
        let course = VirtualCourse::generate(CourseTemplate::Straight);
        let scan = layout().scan(&course, Cell::new(160, 240), Heading::UP);
        assert_eq!(scan.left, 8);
        assert_eq!(scan.right, 8);
        assert_eq!(scan.front, 80);
    }

    #[test]
    fn test_ray_capped_at_max_range() {
        let course = VirtualCourse::from_cells(vec![], vec![], vec![]);
        assert_eq!(ray_cast(&course, Cell::new(0, 0), Heading::UP, 80), 80);
        // Diagonal steps cover more ground
        let diagonal = Heading::from_degrees(45).unwrap();
        assert_eq!(ray_cast(&course, Cell::new(0, 0), diagonal, 80), 113);
    }

    #[test]
    fn test_origin_on_wall() {
        let course = VirtualCourse::from_cells(vec![Cell::new(5, 5)], vec![], vec![]);
        assert_eq!(ray_cast(&course, Cell::new(5, 5), Heading::UP, 80), 0);
    }

    #[test]
    fn test_front_ray_sees_wall_ahead() {
        let wall: Vec<_> = (150..=170).map(|x| Cell::new(x, 220)).collect();
        let course = VirtualCourse::from_cells(wall, vec![], vec![]);
        let scan = layout().scan(&course, Cell::new(160, 240), Heading::UP);
        assert_eq!(scan.front, 20);
    }

    #[test]
    fn test_look_ahead_diagonal() {
        let heading = Heading::from_degrees(225).unwrap();
        let point = layout().look_ahead_point(Cell::new(100, 100), heading);
        assert_eq!(point, Cell::new(107, 107));
    }
}
