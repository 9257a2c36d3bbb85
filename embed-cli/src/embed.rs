use clap::Args;
use std::path::PathBuf;

#[derive(Args, Clone, Debug)]
#[command(about = "Embed a file of sentences into a binary vector file")]
pub struct EmbedArgs {
    /// Input text file (one sentence per line)
    #[arg(long, short, help = "Input text file (one sentence per line)")]
    pub input: PathBuf,

    /// Output binary vector file path
    #[arg(long, short, help = "Output binary vector file path")]
    pub output: PathBuf,

    /// Model spec JSON carrying dimension and normalization flags
    #[arg(long, help = "Model spec JSON (dimension, tokenize, lower_case, ...)")]
    pub model_config: Option<PathBuf>,

    /// Embedding dimensionality when no model spec is given
    #[arg(long, default_value = "300", help = "Embedding dimensionality")]
    pub dimension: usize,

    /// Sub-word tokenizer file (HuggingFace tokenizer.json)
    #[arg(long, help = "Sub-word tokenizer file (HuggingFace tokenizer.json)")]
    pub tokenizer_file: Option<PathBuf>,

    /// Sentences per encoder call
    #[arg(long, default_value = "32", help = "Batch size for encoding")]
    pub batch_size: usize,

    /// Lines held in memory per read group
    #[arg(long, default_value = "10000", help = "Read buffer size in lines")]
    pub read_buffer: usize,

    /// Word-tokenize input before segmentation
    #[arg(long, help = "Word-tokenize input before segmentation")]
    pub tokenize: bool,

    /// Lower-case input before segmentation
    #[arg(long, help = "Lower-case input before segmentation")]
    pub lower_case: bool,

    /// Normalize embeddings
    #[arg(long, help = "Normalize embeddings to unit length")]
    pub normalize: bool,

    /// Write big-endian values instead of little-endian
    #[arg(long, help = "Write big-endian f32 values instead of little-endian")]
    pub big_endian: bool,

    /// Enable debug output
    #[arg(long, help = "Enable debug output")]
    pub debug: bool,
}

/// Comprehensive validation function for EmbedArgs
pub fn validate_embed_args(args: &EmbedArgs) -> anyhow::Result<()> {
    // 1. Validate input file
    validate_input_file(&args.input)?;

    // 2. Validate output path
    validate_output_path(&args.output)?;

    // 3. Validate model spec / tokenizer paths if given
    if let Some(path) = &args.model_config {
        validate_existing_file(path, "Model spec")?;
    }
    if let Some(path) = &args.tokenizer_file {
        validate_existing_file(path, "Tokenizer file")?;
    }

    // 4. Validate parameters
    validate_parameters(args.batch_size, args.read_buffer, args.dimension)?;

    Ok(())
}

/// Validate input file exists and is readable.
///
/// An empty input file is allowed: it produces an empty output file.
fn validate_input_file(input: &std::path::Path) -> anyhow::Result<()> {
    if !input.exists() {
        return Err(anyhow::anyhow!(
            "Input file does not exist: {}\n💡 Ensure file path is correct and file exists",
            input.display()
        ));
    }

    if !input.is_file() {
        return Err(anyhow::anyhow!(
            "Input path is not a file: {}\n💡 Provide path to a text file, not a directory",
            input.display()
        ));
    }

    // Test file readability by trying to open it
    std::fs::File::open(input).map_err(|e| {
        anyhow::anyhow!(
            "Cannot open input file: {}: {}\n💡 Check file permissions and ensure file is readable",
            input.display(),
            e
        )
    })?;

    Ok(())
}

/// Validate output path and ensure directory is writable
fn validate_output_path(output: &std::path::Path) -> anyhow::Result<()> {
    if output.is_dir() {
        return Err(anyhow::anyhow!(
            "Output path is a directory: {}\n💡 Provide a file path for the binary output",
            output.display()
        ));
    }

    // Ensure output directory exists, creating it if necessary
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create output directory '{}': {}\n💡 Check parent directory permissions and disk space",
                    parent.display(),
                    e
                )
            })?;
        }
    }

    Ok(())
}

/// Validate that a referenced auxiliary file exists
fn validate_existing_file(path: &std::path::Path, what: &str) -> anyhow::Result<()> {
    if !path.is_file() {
        return Err(anyhow::anyhow!(
            "{} does not exist: {}\n💡 Ensure the path is correct",
            what,
            path.display()
        ));
    }
    Ok(())
}

/// Validate sizing parameters
fn validate_parameters(
    batch_size: usize,
    read_buffer: usize,
    dimension: usize,
) -> anyhow::Result<()> {
    if batch_size == 0 {
        return Err(anyhow::anyhow!(
            "Batch size must be greater than 0\n💡 Use a reasonable batch size like 32 or 64"
        ));
    }

    if batch_size > 1024 {
        return Err(anyhow::anyhow!(
            "Batch size is too large: {}. Maximum recommended is 1024\n💡 Large batch sizes may cause memory issues",
            batch_size
        ));
    }

    if read_buffer == 0 {
        return Err(anyhow::anyhow!(
            "Read buffer size must be greater than 0\n💡 Use a reasonable buffer like 10000 lines"
        ));
    }

    if dimension == 0 {
        return Err(anyhow::anyhow!(
            "Dimension must be greater than 0\n💡 Use the dimensionality of the embedding model, e.g. 300"
        ));
    }

    Ok(())
}

use embed_pipeline::{
    EmbeddingPipeline, HashEncoder, ModelSpec, NormalizerOptions, PipelineConfig, Segmenter,
    TextNormalizer, ValueEncoding, WhitespaceSegmenter, WordPieceSegmenter,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

impl EmbedArgs {
    /// Resolve the model spec: sidecar JSON if given, CLI flags otherwise
    fn resolve_model_spec(&self) -> anyhow::Result<ModelSpec> {
        let mut spec = match &self.model_config {
            Some(path) => ModelSpec::from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load model spec: {}", e))?,
            None => ModelSpec {
                dimension: self.dimension,
                tokenize: self.tokenize,
                lower_case: self.lower_case,
                normalize: self.normalize,
                tokenizer_file: None,
                encoding: ValueEncoding::F32Le,
            },
        };
        // CLI flags layer on top of the sidecar
        if self.tokenize {
            spec.tokenize = true;
        }
        if self.lower_case {
            spec.lower_case = true;
        }
        if self.normalize {
            spec.normalize = true;
        }
        if let Some(path) = &self.tokenizer_file {
            spec.tokenizer_file = Some(path.clone());
        }
        if self.big_endian {
            spec.encoding = ValueEncoding::F32Be;
        }
        Ok(spec)
    }

    /// Convert CLI args and a resolved spec to a pipeline configuration
    fn to_pipeline_config(&self, spec: &ModelSpec) -> PipelineConfig {
        PipelineConfig {
            read_buffer_size: self.read_buffer,
            batch_size: self.batch_size,
            normalizer: NormalizerOptions {
                tokenize: spec.tokenize,
                lower_case: spec.lower_case,
            },
            encoding: spec.encoding,
            progress_interval: 10_000,
        }
    }
}

/// Main embed command implementation
pub fn run_embed_command(args: EmbedArgs) -> anyhow::Result<()> {
    // 1. Validate input arguments
    validate_embed_args(&args)?;

    info!("Starting embed command");
    info!("Input: {:?}", args.input);
    info!("Output: {:?}", args.output);
    info!("Batch size: {}", args.batch_size);

    // 2. Resolve model spec and build the segmenter it names
    let spec = args.resolve_model_spec()?;
    let segmenter: Box<dyn Segmenter> = match &spec.tokenizer_file {
        Some(path) => Box::new(
            WordPieceSegmenter::from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?,
        ),
        None => Box::new(WhitespaceSegmenter),
    };

    // 3. Assemble the pipeline around the built-in encoder
    let normalizer = TextNormalizer::new(spec.normalizer_options(), segmenter);
    let encoder = Arc::new(HashEncoder::new(spec.dimension, spec.normalize));
    let pipeline = EmbeddingPipeline::new(args.to_pipeline_config(&spec), normalizer, encoder)
        .map_err(|e| anyhow::anyhow!("Failed to initialize pipeline: {}", e))?;

    // 4. Count total lines for progress tracking
    let total_lines = count_lines(&args.input)?;
    println!(
        "Embedding {} sentences ({} dimensions) with batch size {}...",
        total_lines,
        pipeline.dimension(),
        args.batch_size
    );

    // 5. Create progress bar
    let progress_bar = ProgressBar::new(total_lines as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")?
            .progress_chars("██▌ "),
    );

    // 6. Open both ends and run, updating progress per group
    let source = BufReader::new(File::open(&args.input)?);
    let sink = BufWriter::new(File::create(&args.output)?);

    let processing_start = Instant::now();
    let stats = pipeline
        .run_with_progress(source, sink, |s| {
            progress_bar.set_position(s.lines as u64);
            let secs = s.elapsed.as_secs_f64();
            if secs > 0.0 {
                progress_bar.set_message(format!("{:.1} sentences/s", s.lines as f64 / secs));
            }
        })
        .map_err(|e| anyhow::anyhow!("Failed to embed file: {}", e))?;

    // 7. Finalize progress bar and show summary
    progress_bar.finish_with_message("Embedding complete");
    let total_time = processing_start.elapsed();
    let throughput = if total_time.as_secs() > 0 {
        stats.lines as f64 / total_time.as_secs_f64()
    } else {
        0.0
    };

    println!();
    println!("Embedding complete!");
    println!("Total sentences: {}", stats.lines);
    println!("Processing time: {:.1}s", total_time.as_secs_f64());
    println!("Throughput: {:.1} sentences/s", throughput);
    println!(
        "Output written to: {} ({} bytes)",
        args.output.display(),
        stats.bytes_written
    );

    Ok(())
}

/// Count lines in a file for progress tracking
fn count_lines(input_path: &std::path::Path) -> anyhow::Result<usize> {
    let file = File::open(input_path)?;
    let mut reader = BufReader::new(file);
    let mut count = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        count += 1;
    }
    Ok(count)
}
