//! Build script for pixport-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates panel.toml and generates the `PANEL_CONFIG` constants
//! - Links the prebuilt LVGL static library

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    link_lvgl();
    let panel = validate_config();
    generate_config(&panel);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Link liblvgl.a, built for thumbv6m with the project's lv_conf.h
fn link_lvgl() {
    println!("cargo:rerun-if-env-changed=LVGL_LIB_DIR");

    let lib_dir = match env::var("LVGL_LIB_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: LVGL_LIB_DIR is not set                                  ║\n\
                ║                                                                  ║\n\
                ║  Point it at the directory containing liblvgl.a, built for       ║\n\
                ║  thumbv6m-none-eabi with LV_COLOR_DEPTH 16.                      ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n"
            );
        }
    };

    if !lib_dir.join("liblvgl.a").exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: liblvgl.a not found                                      ║\n\
            ║                                                                  ║\n\
            ║  Searched: {:<53} ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            truncate(&lib_dir.display().to_string(), 53)
        );
    }

    println!("cargo:rustc-link-search=native={}", lib_dir.display());
    println!("cargo:rustc-link-lib=static=lvgl");
}

/// Values read from panel.toml
struct PanelToml {
    width: i64,
    height: i64,
    x_offset: i64,
    y_offset: i64,
    orientation: &'static str,
    invert_colors: bool,
    pixel_order: &'static str,
    divisor: i64,
    double_buffer: bool,
    tick_period_ms: i64,
    loop_period_ms: i64,
    touch_width: i64,
    touch_height: i64,
    swap_xy: bool,
    invert_x: bool,
    invert_y: bool,
}

impl PanelToml {
    fn is_landscape(&self) -> bool {
        self.orientation.starts_with("Landscape")
    }

    /// Visible (width, height) after orientation
    fn geometry(&self) -> (i64, i64) {
        if self.is_landscape() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

/// Collects errors while reading one section
struct Section<'a> {
    name: &'static str,
    table: Option<&'a toml::value::Table>,
    errors: &'a mut Vec<String>,
}

impl<'a> Section<'a> {
    fn new(config: &'a toml::Value, name: &'static str, errors: &'a mut Vec<String>) -> Self {
        let table = match config.get(name) {
            Some(toml::Value::Table(t)) => Some(t),
            Some(_) => {
                errors.push(format!("[{}] must be a table", name));
                None
            }
            None => {
                errors.push(format!("Missing [{}] section", name));
                None
            }
        };
        Self {
            name,
            table,
            errors,
        }
    }

    fn int(&mut self, key: &str, min: i64, max: i64) -> i64 {
        let Some(table) = self.table else {
            return min;
        };
        match table.get(key) {
            Some(toml::Value::Integer(v)) if (min..=max).contains(v) => *v,
            Some(toml::Value::Integer(_)) => {
                self.errors
                    .push(format!("[{}] {} must be {}-{}", self.name, key, min, max));
                min
            }
            Some(_) => {
                self.errors
                    .push(format!("[{}] {} must be an integer", self.name, key));
                min
            }
            None => {
                self.errors.push(format!("[{}] missing '{}'", self.name, key));
                min
            }
        }
    }

    fn boolean(&mut self, key: &str, default: bool) -> bool {
        let Some(table) = self.table else {
            return default;
        };
        match table.get(key) {
            Some(toml::Value::Boolean(v)) => *v,
            Some(_) => {
                self.errors
                    .push(format!("[{}] {} must be true or false", self.name, key));
                default
            }
            None => default,
        }
    }

    /// Map a string option onto one of `choices` (toml name, Rust variant)
    fn choice(
        &mut self,
        key: &str,
        choices: &[(&str, &'static str)],
        default: &'static str,
    ) -> &'static str {
        let Some(table) = self.table else {
            return default;
        };
        match table.get(key) {
            Some(toml::Value::String(s)) => {
                match choices.iter().find(|(name, _)| *name == s.as_str()) {
                    Some((_, variant)) => *variant,
                    None => {
                        let names: Vec<&str> = choices.iter().map(|(name, _)| *name).collect();
                        self.errors.push(format!(
                            "[{}] {} must be one of: {}",
                            self.name,
                            key,
                            names.join(", ")
                        ));
                        default
                    }
                }
            }
            Some(_) => {
                self.errors
                    .push(format!("[{}] {} must be a string", self.name, key));
                default
            }
            None => default,
        }
    }
}

/// Validate panel.toml configuration at compile time
fn validate_config() -> PanelToml {
    println!("cargo:rerun-if-changed=panel.toml");

    let config_path = Path::new("panel.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: panel.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a panel.toml configuration file           ║\n\
            ║  in the pixport-firmware directory.                              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read panel.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                truncate(&e.to_string(), 56)
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in panel.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let panel = read_panel(&config);

    println!("cargo:warning=panel.toml validated successfully");
    panel
}

fn read_panel(config: &toml::Value) -> PanelToml {
    let mut errors = Vec::new();

    let mut display = Section::new(config, "display", &mut errors);
    let width = display.int("width", 1, 240);
    let height = display.int("height", 1, 320);
    let x_offset = display.int("x_offset", 0, 239);
    let y_offset = display.int("y_offset", 0, 319);
    let orientation = display.choice(
        "orientation",
        &[
            ("portrait", "Portrait"),
            ("landscape", "Landscape"),
            ("portrait_flipped", "PortraitFlipped"),
            ("landscape_flipped", "LandscapeFlipped"),
        ],
        "Portrait",
    );
    let invert_colors = display.boolean("invert_colors", true);
    let pixel_order = display.choice(
        "pixel_order",
        &[("native", "Native"), ("swapped", "Swapped")],
        "Native",
    );

    let mut buffer = Section::new(config, "buffer", &mut errors);
    let divisor = buffer.int("divisor", 1, 320);
    let double_buffer = buffer.boolean("double", true);

    let mut timing = Section::new(config, "timing", &mut errors);
    let tick_period_ms = timing.int("tick_period_ms", 1, 100);
    let loop_period_ms = timing.int("loop_period_ms", 1, 1000);

    let mut touch = Section::new(config, "touch", &mut errors);
    let touch_width = touch.int("width", 1, 4095);
    let touch_height = touch.int("height", 1, 4095);
    let swap_xy = touch.boolean("swap_xy", false);
    let invert_x = touch.boolean("invert_x", false);
    let invert_y = touch.boolean("invert_y", false);

    let panel = PanelToml {
        width,
        height,
        x_offset,
        y_offset,
        orientation,
        invert_colors,
        pixel_order,
        divisor,
        double_buffer,
        tick_period_ms,
        loop_period_ms,
        touch_width,
        touch_height,
        swap_xy,
        invert_x,
        invert_y,
    };

    // Cross-field checks
    if panel.x_offset + panel.width > 240 {
        errors.push("[display] x_offset + width exceeds controller RAM (240)".to_string());
    }
    if panel.y_offset + panel.height > 320 {
        errors.push("[display] y_offset + height exceeds controller RAM (320)".to_string());
    }
    let (_, visible_height) = panel.geometry();
    if panel.divisor > visible_height {
        errors.push("[buffer] divisor leaves less than one row per buffer".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid panel configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", truncate(e, 62)))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    panel
}

/// Write OUT_DIR/panel_config.rs
fn generate_config(panel: &PanelToml) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let (width, height) = panel.geometry();

    let source = format!(
        "// Generated from panel.toml by build.rs\n\
         \n\
         /// Port configuration\n\
         pub const PANEL_CONFIG: PortConfig = PortConfig {{\n\
         \x20   geometry: DisplayGeometry::new({width}, {height}),\n\
         \x20   buffer_divisor: {divisor},\n\
         \x20   double_buffer: {double_buffer},\n\
         \x20   tick_period_ms: {tick},\n\
         \x20   loop_period_ms: {loop_ms},\n\
         \x20   pixel_order: PixelOrder::{pixel_order},\n\
         \x20   touch: TouchMapping {{\n\
         \x20       width: {touch_width},\n\
         \x20       height: {touch_height},\n\
         \x20       swap_xy: {swap_xy},\n\
         \x20       invert_x: {invert_x},\n\
         \x20       invert_y: {invert_y},\n\
         \x20   }},\n\
         }};\n\
         \n\
         /// ST7789 driver configuration\n\
         pub const PANEL_DRIVER: St7789Config = St7789Config {{\n\
         \x20   width: {native_width},\n\
         \x20   height: {native_height},\n\
         \x20   x_offset: {x_offset},\n\
         \x20   y_offset: {y_offset},\n\
         \x20   orientation: Orientation::{orientation},\n\
         \x20   invert_colors: {invert_colors},\n\
         }};\n",
        divisor = panel.divisor,
        double_buffer = panel.double_buffer,
        tick = panel.tick_period_ms,
        loop_ms = panel.loop_period_ms,
        pixel_order = panel.pixel_order,
        touch_width = panel.touch_width,
        touch_height = panel.touch_height,
        swap_xy = panel.swap_xy,
        invert_x = panel.invert_x,
        invert_y = panel.invert_y,
        native_width = panel.width,
        native_height = panel.height,
        x_offset = panel.x_offset,
        y_offset = panel.y_offset,
        orientation = panel.orientation,
        invert_colors = panel.invert_colors,
    );

    let mut f = File::create(out_dir.join("panel_config.rs")).unwrap();
    f.write_all(source.as_bytes()).unwrap();
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| format!("║  {:<64} ║", truncate(line, 64)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(line: &str, max: usize) -> String {
    if line.chars().count() > max {
        let head: String = line.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}
