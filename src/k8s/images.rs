//! Node image builds with docker

use owo_colors::OwoColorize;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::{Action, ImageSource, TargetOs};
use crate::utils::progress::TaskProgress;
use crate::utils::{CommandError, CommandRunner, Logger, command_line};

/// Outcome of building or removing one image
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub image_name: String,
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
    pub build_time: Duration,
}

/// Per-image results, in configuration order
#[derive(Debug, Clone)]
pub struct ImageReport {
    pub action: Action,
    pub results: Vec<BuildResult>,
}

impl ImageReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &BuildResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

impl fmt::Display for ImageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} images: {} succeeded, {} failed",
            self.action,
            self.succeeded(),
            self.failed()
        )
    }
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("docker daemon is not reachable: {0}")]
    DaemonUnreachable(#[source] CommandError),
}

/// Builds (or removes) every configured image in parallel
pub struct ImageBuilder<'a> {
    runner: &'a dyn CommandRunner,
    images: &'a [ImageSource],
    log: Logger,
    show_progress: bool,
}

impl<'a> ImageBuilder<'a> {
    pub fn new(runner: &'a dyn CommandRunner, images: &'a [ImageSource], log: Logger) -> Self {
        Self {
            runner,
            images,
            log,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn manage(&self, action: Action) -> Result<ImageReport, ImageError> {
        if action == Action::Create {
            self.runner
                .run("docker info")
                .map_err(ImageError::DaemonUnreachable)?;
        }

        let host = TargetOs::host();
        for image in self.images {
            if image.system != host {
                self.log.warn(format!(
                    "Image '{}' declares a {} source path but the host is {}",
                    image.name, image.system, host
                ));
            }
        }

        let verb = match action {
            Action::Create => "Building",
            Action::Remove => "Removing",
        };
        self.log
            .info(format!("{} {} image(s)...", verb, self.images.len()));

        let labels: Vec<String> = self
            .images
            .iter()
            .map(|i| format!("{} {}", verb, i.reference()))
            .collect();
        let progress = if self.show_progress {
            TaskProgress::new(&labels)
        } else {
            TaskProgress::hidden(labels.len())
        };

        let results = std::thread::scope(|s| {
            let handles: Vec<_> = self
                .images
                .iter()
                .enumerate()
                .map(|(index, image)| {
                    let progress = &progress;
                    s.spawn(move || {
                        let result = self.run_one(action, image);
                        let status = if result.success {
                            format!("{} {}", "✓".bright_green(), image.reference())
                        } else {
                            format!("{} {}", "✗".bright_red().bold(), image.reference())
                        };
                        progress.finish_task(index, status);
                        result
                    })
                })
                .collect();

            handles
                .into_iter()
                .zip(self.images)
                .map(|(handle, image)| {
                    handle.join().unwrap_or_else(|_| BuildResult {
                        image_name: image.name.clone(),
                        success: false,
                        output: String::new(),
                        error: Some("worker thread panicked".to_string()),
                        build_time: Duration::ZERO,
                    })
                })
                .collect::<Vec<_>>()
        });

        for result in &results {
            if result.success {
                self.log.info(format!(
                    "{} finished in {:.1}s",
                    result.image_name,
                    result.build_time.as_secs_f64()
                ));
                self.log.output("docker output", &result.output);
            } else {
                self.log.error(format!(
                    "{} failed: {}",
                    result.image_name,
                    result.error.as_deref().unwrap_or("unknown error")
                ));
            }
        }

        let report = ImageReport { action, results };
        self.log.info(&report);
        Ok(report)
    }

    fn run_one(&self, action: Action, image: &ImageSource) -> BuildResult {
        let command = match action {
            Action::Create => build_command(image),
            Action::Remove => command_line(["docker", "rmi", &image.reference()]),
        };

        let started = Instant::now();
        let outcome = self.runner.run(&command);
        let build_time = started.elapsed();

        match outcome {
            Ok(output) => BuildResult {
                image_name: image.name.clone(),
                success: true,
                output: output.to_string(),
                error: None,
                build_time,
            },
            Err(e) => BuildResult {
                image_name: image.name.clone(),
                success: false,
                output: e.output.stdout.clone(),
                error: Some(e.to_string()),
                build_time,
            },
        }
    }
}

/// `docker build -t name:tag [--build-arg K=V ...] [-f dockerfile] path`
pub fn build_command(image: &ImageSource) -> String {
    let reference = image.reference();
    let mut args: Vec<String> = vec![
        "docker".to_string(),
        "build".to_string(),
        "-t".to_string(),
        reference,
    ];

    for (key, value) in &image.build_args {
        args.push("--build-arg".to_string());
        args.push(format!("{}={}", key, value));
    }

    if let Some(dockerfile) = &image.dockerfile {
        args.push("-f".to_string());
        args.push(dockerfile.clone());
    }

    args.push(image.path.clone());
    command_line(args)
}
