//! Virtual course templates
//!
//! Each template lays out ordered left-wall cells, ordered right-wall cells
//! and a finish line on the 320×240 display grid. The vehicle starts at
//! (160, 240) facing up the screen. Cells off the grid count as wall on
//! every template, so a vehicle that leaves the course through a gap still
//! ends its run.

use super::grid::Cell;
use crate::constants::{GRID_HEIGHT, GRID_WIDTH};
use crate::core::display::DisplaySink;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Built-in course layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseTemplate {
    /// 100-cell corridor, 16 cells wide
    #[default]
    Straight,
    /// Corridor bending 90° to the left
    LeftTurn,
    /// Corridor bending 90° to the right
    RightTurn,
    /// Straight corridor whose left wall detours outward midway
    LeftBranch,
    /// Straight corridor with a recess in the right wall
    SpaceRight,
    /// Straight corridor crossed by a side passage
    Intersection,
}

/// Immutable wall and finish geometry
#[derive(Debug, Clone)]
pub struct VirtualCourse {
    template: Option<CourseTemplate>,
    left_wall: Vec<Cell>,
    right_wall: Vec<Cell>,
    finish: Vec<Cell>,
    walls: HashSet<Cell>,
    finish_cells: HashSet<Cell>,
    /// Inclusive (x, y) limits; cells beyond them are wall
    bounds: Option<(i32, i32)>,
}

impl VirtualCourse {
    /// Lay out a built-in template
    pub fn generate(template: CourseTemplate) -> Self {
        let (left, right, finish) = match template {
            CourseTemplate::Straight => straight(),
            CourseTemplate::LeftTurn => left_turn(),
            CourseTemplate::RightTurn => right_turn(),
            CourseTemplate::LeftBranch => left_branch(),
            CourseTemplate::SpaceRight => space_right(),
            CourseTemplate::Intersection => intersection(),
        };
        let mut course = Self::from_cells(left, right, finish);
        course.template = Some(template);
        course.bounds = Some((GRID_WIDTH, GRID_HEIGHT));
        course
    }

    /// Unbounded course from explicit cell lists
    pub fn from_cells(left_wall: Vec<Cell>, right_wall: Vec<Cell>, finish: Vec<Cell>) -> Self {
        let walls = left_wall.iter().chain(right_wall.iter()).copied().collect();
        let finish_cells = finish.iter().copied().collect();
        Self {
            template: None,
            left_wall,
            right_wall,
            finish,
            walls,
            finish_cells,
            bounds: None,
        }
    }

    #[inline]
    pub fn is_wall(&self, cell: Cell) -> bool {
        match self.bounds {
            Some((width, height))
                if !(0..=width).contains(&cell.x) || !(0..=height).contains(&cell.y) =>
            {
                true
            }
            _ => self.walls.contains(&cell),
        }
    }

    #[inline]
    pub fn is_finish(&self, cell: Cell) -> bool {
        self.finish_cells.contains(&cell)
    }

    pub fn template(&self) -> Option<CourseTemplate> {
        self.template
    }

    pub fn left_wall(&self) -> &[Cell] {
        &self.left_wall
    }

    pub fn right_wall(&self) -> &[Cell] {
        &self.right_wall
    }

    pub fn finish(&self) -> &[Cell] {
        &self.finish
    }

    /// Clear the display and draw walls and finish line
    pub fn draw(&self, display: &mut dyn DisplaySink) {
        display.clear();
        for cell in self.left_wall.iter().chain(self.right_wall.iter()) {
            display.draw_pixel(cell.x, cell.y);
        }
        if let (Some(first), Some(last)) = (self.finish.first(), self.finish.last()) {
            display.draw_line(first.x, first.y, last.x, last.y);
        }
    }
}

type Layout = (Vec<Cell>, Vec<Cell>, Vec<Cell>);

fn straight() -> Layout {
    let left = (0..100).map(|i| Cell::new(152, 240 - i)).collect();
    let right = (0..100).map(|i| Cell::new(168, 240 - i)).collect();
    let finish = (0..17).map(|i| Cell::new(152 + i, 139)).collect();
    (left, right, finish)
}

fn right_turn() -> Layout {
    let left = (0..100)
        .map(|i| match i {
            0..25 => Cell::new(145, 240 - i),
            25..75 => Cell::new(146 + (i - 25) / 2, 215 - (i - 24) / 2),
            _ => Cell::new(170 + (i - 74), 190),
        })
        .collect();
    let right = (0..40)
        .map(|i| match i {
            0..10 => Cell::new(175, 240 - i),
            10..30 => Cell::new(176 + (i - 10) / 2, 230 - (i - 9) / 2),
            _ => Cell::new(185 + (i - 29), 220),
        })
        .collect();
    let finish = (0..31).map(|i| Cell::new(195, 220 - i)).collect();
    (left, right, finish)
}

fn left_turn() -> Layout {
    let right = (0..100)
        .map(|i| match i {
            0..25 => Cell::new(175, 240 - i),
            25..75 => Cell::new(174 - (i - 25) / 2, 215 - (i - 24) / 2),
            _ => Cell::new(150 - (i - 74), 190),
        })
        .collect();
    let left = (0..40)
        .map(|i| match i {
            0..10 => Cell::new(145, 240 - i),
            10..30 => Cell::new(144 - (i - 10) / 2, 230 - (i - 9) / 2),
            _ => Cell::new(135 - (i - 29), 220),
        })
        .collect();
    let finish = (0..31).map(|i| Cell::new(125, 220 - i)).collect();
    (left, right, finish)
}

fn space_right() -> Layout {
    let left = (0..100).map(|i| Cell::new(152, 240 - i)).collect();
    let right = (0..100)
        .map(|i| {
            let x = if i > 24 && i < 75 { 178 } else { 168 };
            Cell::new(x, 240 - i)
        })
        .collect();
    let finish = (0..17).map(|i| Cell::new(152 + i, 139)).collect();
    (left, right, finish)
}

fn intersection() -> Layout {
    let mut left = Vec::with_capacity(100);
    let mut right = Vec::with_capacity(100);
    for i in 0..100 {
        let (l, r) = match i {
            0..25 => (Cell::new(152, 240 - i), Cell::new(168, 240 - i)),
            25..50 => (Cell::new(152 - (i - 25), 216), Cell::new(168 + (i - 25), 216)),
            50..75 => (Cell::new(127 + (i - 50), 200), Cell::new(193 - (i - 50), 200)),
            _ => (Cell::new(152, 200 - (i - 75)), Cell::new(168, 200 - (i - 75))),
        };
        left.push(l);
        right.push(r);
    }
    let finish = (0..17).map(|i| Cell::new(152 + i, 176)).collect();
    (left, right, finish)
}

fn left_branch() -> Layout {
    let right = (0..64).map(|i| Cell::new(168, 240 - i)).collect();
    let left = (0..100)
        .map(|i| match i {
            0..25 => Cell::new(152, 240 - i),
            25..50 => Cell::new(151 - (i - 25) / 2, 216 - (i - 24) / 2),
            50..75 => Cell::new(151 - (i - 50) / 2, 200 - (i - 49) / 2),
            _ => Cell::new(152, 200 - (i - 75)),
        })
        .collect();
    let finish = (0..17).map(|i| Cell::new(152 + i, 176)).collect();
    (left, right, finish)
}
