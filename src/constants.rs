//! Message catalog and calibration constants

// Timer messages
pub const MSG_NAV_TIMER: u8 = 3; // Navigation loop period elapsed
pub const MSG_SIM_TIMER: u8 = 9; // Simulation tick

// Navigation feedback
pub const MSG_UPDATE_SPEED: u8 = 5; // value2 = new cruise speed
pub const MSG_DISTANCE: u8 = 10; // Fused side distances (value1 = left, value2 = right)
pub const MSG_FRONT_VALUE: u8 = 11; // Front distance in value2

// Path transitions (value2 = radius)
pub const MSG_MAP_STRAIGHT: u8 = 12;
pub const MSG_MAP_TURN_LEFT: u8 = 13;
pub const MSG_MAP_TURN_RIGHT: u8 = 14;
pub const MSG_MAP_HALT: u8 = 15;
pub const MSG_PRINT_MAP: u8 = 16; // Dump path log to the display
pub const MSG_UPDATE_RUN_MAP: u8 = 17; // Switch path mapper to replay

// Run control
pub const MSG_FINISH_LINE: u8 = 18; // Vehicle crossed the finish line
pub const MSG_RUN_START: u8 = 19;
pub const MSG_RUN_STOP: u8 = 20;

// Transport link traffic
pub const MSG_MOTOR_SEND: u8 = 52; // Actuator command [seq, speed, radius]
pub const MSG_MOTOR_READ: u8 = 53; // Wheel encoder distances (value1 = left, value2 = right)
pub const MSG_ACC_READ: u8 = 54; // Accelerometer telemetry
pub const MSG_IR_LEFT: u8 = 55;
pub const MSG_IR_FRONT: u8 = 56;
pub const MSG_IR_RIGHT: u8 = 57;

// Radius codes
pub const RADIUS_SPIN_LEFT: u8 = 0;
pub const RADIUS_STRAIGHT: u8 = 127;
pub const RADIUS_SPIN_RIGHT: u8 = 128;
pub const RADIUS_RIGHT_OFFSET: u8 = 128; // Right turns are 128 + radius
pub const RADIUS_UNSET: u8 = 255; // Path mapper radius before the first transition

// IR ranging calibration: distance_cm = SCALE * BASE^(adc * VREF / ADC_RANGE)
pub const IR_CALIBRATION_SCALE: f64 = 102.5149651;
pub const IR_CALIBRATION_BASE: f64 = 0.3091605258;
pub const IR_REFERENCE_VOLTAGE: f64 = 5.0;
pub const IR_ADC_RANGE: f64 = 1024.0;
pub const IR_ADC_MAX: u16 = 1023; // 10-bit sample

// Course grid, inclusive upper bounds (the start cell sits on the bottom edge)
pub const GRID_WIDTH: i32 = 320;
pub const GRID_HEIGHT: i32 = 240;

// Display geometry
pub const DISPLAY_LINE_WIDTH: usize = 20; // Characters per text row
pub const DISPLAY_ROW_IR_LEFT: u8 = 0;
pub const DISPLAY_ROW_IR_FRONT: u8 = 1;
pub const DISPLAY_ROW_IR_RIGHT: u8 = 2;
pub const DISPLAY_ROW_ACCEL: u8 = 3;
pub const DISPLAY_ROW_FRONT: u8 = 4;
pub const DISPLAY_ROW_HEARTBEAT: u8 = 7;
pub const DISPLAY_ROW_STEERING: u8 = 8;
pub const DISPLAY_ROW_STATUS: u8 = 9;

/// Navigation ticks between heartbeat lines
pub const HEARTBEAT_EVERY: u32 = 10;
