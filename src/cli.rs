use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pinyinsub",
    about = "Align pinyin to Hanzi and lay out annotated lesson frames for video subtitles",
    version,
    after_help = "\x1b[1mExamples:\x1b[0m
  pinyinsub init ./lesson-1                      Create a lesson with a sample script
  pinyinsub align 我们好 --pinyin \"wǒ menhǎo\"     Show per-character syllables
  pinyinsub layout ./lesson-1/lesson.txt -o layout.json   Compute frame layout
  pinyinsub srt ./lesson-1/lesson.txt            Write lesson.srt next to the script
  pinyinsub fonts                                Check which fonts will be used"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a lesson directory with pinyinsub.toml and a sample script
    Init {
        /// Path to create the lesson directory
        path: PathBuf,

        /// Frames per second
        #[arg(long)]
        fps: Option<u32>,

        /// Width of the top text box in pixels
        #[arg(long)]
        max_width: Option<f32>,

        /// Height budget of the top text box in pixels
        #[arg(long)]
        max_height: Option<f32>,

        /// Starting font size before shrinking to fit
        #[arg(long)]
        font_size: Option<f32>,

        /// Comma-separated Hanzi font families or files, in priority order
        #[arg(long, value_delimiter = ',')]
        hanzi_fonts: Option<Vec<String>>,

        /// Comma-separated Latin font families or files, in priority order
        #[arg(long, value_delimiter = ',')]
        latin_fonts: Option<Vec<String>>,
    },
    /// Align a pinyin string to the characters of a Hanzi string
    Align {
        /// Hanzi text
        hanzi: String,

        /// Pinyin for the text, spaced or run together
        #[arg(long, short = 'p')]
        pinyin: Option<String>,

        /// Print the alignment as JSON
        #[arg(long)]
        json: bool,
    },
    /// Paginate and lay out a lesson script as JSON for a frame renderer
    Layout {
        /// Path to the lesson script
        script: PathBuf,

        /// Config file (default: pinyinsub.toml next to the script)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output JSON file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Maximum number of lines aligned in parallel (default: 4)
        #[arg(long)]
        parallel: Option<usize>,
    },
    /// Write SRT subtitles with Hanzi, aligned pinyin and translation
    Srt {
        /// Path to the lesson script
        script: PathBuf,

        /// Config file (default: pinyinsub.toml next to the script)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output SRT file (default: script path with .srt extension)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Report which fonts will be used and whether they render Hanzi
    Fonts {
        /// Config file (default: ./pinyinsub.toml if present)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Exit with an error if any font falls back to builtin metrics
        #[arg(long)]
        strict: bool,
    },
}
