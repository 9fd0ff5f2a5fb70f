use crate::device_capture::captured_image::CapturedImage;
use crate::device_display::interface::DeviceDisplay;
use std::error::Error;
use std::io::Write;

pub struct DeviceDisplayConsole {
    width: usize,
}

impl DeviceDisplayConsole {
    pub fn new() -> Self {
        Self { width: 44 }
    }

    fn frame(&self, lines: &[String]) -> String {
        let mut out = format!("┌{}┐\n", "─".repeat(self.width));
        for line in lines {
            let clipped: String = line.chars().take(self.width).collect();
            let padding = self.width - clipped.chars().count();
            out.push_str(&format!("│{}{}│\n", clipped, " ".repeat(padding)));
        }
        out.push_str(&format!("└{}┘", "─".repeat(self.width)));
        out
    }

    fn print(&self, lines: &[String]) -> Result<(), Box<dyn Error + Send + Sync>> {
        writeln!(std::io::stdout().lock(), "{}", self.frame(lines))?;
        Ok(())
    }
}

impl DeviceDisplay for DeviceDisplayConsole {
    fn show_preview(&mut self, image: &CapturedImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        let source = match &image.source_path {
            Some(path) => path.display().to_string(),
            None => "photo library".to_string(),
        };
        self.print(&[
            format!("Preview {}x{}", image.width, image.height),
            source,
        ])
    }

    fn show_text(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let lines: Vec<String> = text.lines().map(String::from).collect();
        self.print(&lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_pads_and_clips_lines() {
        let display = DeviceDisplayConsole { width: 6 };

        let framed = display.frame(&["abc".to_string(), "abcdefgh".to_string()]);

        assert_eq!(framed, "┌──────┐\n│abc   │\n│abcdef│\n└──────┘");
    }
}
