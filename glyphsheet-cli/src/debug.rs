//! SVG diagnostics for a pass.

use std::{fs, path::Path};

use glyphsheet::{
    bbox::BoundingBox,
    density::DensityCurve,
    lines::TextLine,
    merge::{MergeReason, MergeRecord},
    observer::{Event, Observer},
    Cluster, ClusterCenters, NormalizedGlyph,
};

use crate::sheet::CliError;

const LINE_COLORS: [&str; 6] = ["#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4"];
const HISTOGRAM_BINS: usize = 40;
const PLOT_WIDTH: f64 = 800.0;
const PLOT_HEIGHT: f64 = 400.0;

/// Collects pipeline events and renders them once the pass is over.
#[derive(Default)]
pub struct DebugRecorder {
    merges: Vec<MergeRecord>,
    lines: Option<(Vec<BoundingBox>, Vec<TextLine>)>,
    toplines: Vec<f64>,
    fit: Option<(DensityCurve, Vec<usize>)>,
    centers: Option<ClusterCenters>,
    normalized: Vec<NormalizedGlyph>,
}

impl Observer for DebugRecorder {
    fn observe(&mut self, event: &Event<'_>) {
        log::trace!("{} event", event.stage().name());
        match event {
            Event::Merged(record) => self.merges.push((*record).clone()),
            // the last grouping is the one baselines are measured on
            Event::LinesSegmented { bboxes, lines, .. } => {
                self.lines = Some((bboxes.to_vec(), lines.to_vec()))
            }
            Event::Classified(table) => self.toplines = table.toplines().collect(),
            Event::DensityFitted { curve, peaks } => {
                self.fit = Some(((*curve).clone(), peaks.to_vec()))
            }
            Event::CentersResolved { centers, .. } => self.centers = Some(**centers),
            Event::ScaleOutOfRange { .. } => (),
            Event::Normalized(glyphs) => self.normalized = glyphs.to_vec(),
        }
    }
}

impl DebugRecorder {
    /// Writes one SVG per recorded stage into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<(), CliError> {
        fs::create_dir_all(dir).map_err(|source| CliError::Write {
            path: dir.to_owned(),
            source,
        })?;
        let mut files = vec![("merges.svg", self.merges_svg())];
        if let Some((bboxes, lines)) = &self.lines {
            files.push(("lines.svg", lines_svg(bboxes, lines)));
        }
        if !self.toplines.is_empty() {
            files.push(("heights.svg", self.heights_svg()));
        }
        if !self.normalized.is_empty() {
            files.push(("normalized_glyphs.svg", self.normalized_svg()));
        }
        for (name, contents) in files {
            let path = dir.join(name);
            fs::write(&path, contents).map_err(|source| CliError::Write { path, source })?;
        }
        log::debug!("wrote diagnostics to {dir:?}");
        Ok(())
    }

    fn merges_svg(&self) -> String {
        let bounds = union_all(
            self.merges
                .iter()
                .flat_map(|record| [record.primary_bbox, record.secondary_bbox]),
        );
        let mut doc = SvgDocument::new(bounds);
        for record in &self.merges {
            let color = match record.reason {
                MergeReason::Containment => "#4363d8",
                MergeReason::PartialContainment => "#3cb44b",
                MergeReason::Attachment => "#e6194b",
            };
            doc.rect(&record.primary_bbox, "#888888", None);
            doc.rect(&record.secondary_bbox, color, Some(color));
            doc.text(
                record.secondary_bbox.x_min,
                record.secondary_bbox.y_min - 2.0,
                &format!("{}→{}", record.secondary, record.primary),
            );
        }
        doc.finish()
    }

    fn heights_svg(&self) -> String {
        let values = &self.toplines;
        let (lo, hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 1.0, hi + 1.0) };
        let bin_width = (hi - lo) / HISTOGRAM_BINS as f64;
        let mut counts = [0usize; HISTOGRAM_BINS];
        for v in values {
            let bin = (((v - lo) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
            counts[bin] += 1;
        }
        let max_count = counts.iter().copied().max().unwrap_or(1).max(1) as f64;
        let x = |v: f64| (v - lo) / (hi - lo) * PLOT_WIDTH;

        let mut doc = SvgDocument::new(BoundingBox::new(0.0, PLOT_WIDTH, 0.0, PLOT_HEIGHT));
        for (bin, count) in counts.iter().enumerate() {
            let height = *count as f64 / max_count * PLOT_HEIGHT;
            let x_min = bin as f64 * PLOT_WIDTH / HISTOGRAM_BINS as f64;
            let bar = BoundingBox::new(
                x_min,
                x_min + PLOT_WIDTH / HISTOGRAM_BINS as f64,
                PLOT_HEIGHT - height,
                PLOT_HEIGHT,
            );
            doc.rect(&bar, "#ffffff", Some("#a9a9a9"));
        }
        if let Some((curve, peaks)) = &self.fit {
            let max_density = curve.density.iter().copied().fold(0.0, f64::max);
            if max_density > 0.0 {
                let y = |d: f64| PLOT_HEIGHT - d / max_density * PLOT_HEIGHT;
                let points: Vec<_> = curve
                    .grid
                    .iter()
                    .zip(&curve.density)
                    .map(|(g, d)| format!("{:.2},{:.2}", x(*g), y(*d)))
                    .collect();
                doc.polyline(&points.join(" "), "#000000");
                for (g, d) in curve.points(peaks) {
                    doc.circle(x(g), y(d), 4.0, "#e6194b");
                }
            }
        }
        if let Some(centers) = &self.centers {
            for (cluster, color) in Cluster::ALL.iter().zip(LINE_COLORS) {
                let v = centers.for_cluster(*cluster);
                if v > lo && v < hi {
                    doc.vline(x(v), color);
                    doc.text(x(v) + 2.0, 12.0, &format!("{cluster:?} {v:.1}"));
                }
            }
        }
        doc.finish()
    }

    fn normalized_svg(&self) -> String {
        let bounds = union_all(self.normalized.iter().map(|glyph| glyph.bbox));
        let mut doc = SvgDocument::new(bounds);
        if let Some(centers) = &self.centers {
            let lines = centers.reference_lines();
            for (v, color) in [
                lines.base_line,
                lines.x_height,
                lines.cap_height,
                lines.full_height,
            ]
            .into_iter()
            .zip(LINE_COLORS)
            {
                doc.hline(v, color);
            }
        }
        for glyph in &self.normalized {
            doc.path(glyph.path.as_str());
        }
        doc.finish()
    }
}

fn lines_svg(bboxes: &[BoundingBox], lines: &[TextLine]) -> String {
    let mut doc = SvgDocument::new(union_all(bboxes.iter().copied()));
    for (line, color) in lines.iter().zip(LINE_COLORS.iter().cycle()) {
        for bbox in line.members.iter().filter_map(|ix| bboxes.get(*ix)) {
            doc.rect(bbox, color, None);
        }
        doc.hline(line.center, color);
    }
    doc.finish()
}

fn union_all(bboxes: impl Iterator<Item = BoundingBox>) -> BoundingBox {
    bboxes
        .reduce(|acc, bbox| acc.union(&bbox))
        .unwrap_or(BoundingBox::new(0.0, 1.0, 0.0, 1.0))
}

/// A minimal SVG document in sheet coordinates.
struct SvgDocument {
    view: BoundingBox,
    body: String,
}

impl SvgDocument {
    fn new(view: BoundingBox) -> Self {
        Self {
            view,
            body: String::new(),
        }
    }

    fn rect(&mut self, bbox: &BoundingBox, stroke: &str, fill: Option<&str>) {
        self.body.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" stroke=\"{stroke}\" fill=\"{}\" fill-opacity=\"0.3\"/>\n",
            bbox.x_min,
            bbox.y_min,
            bbox.width(),
            bbox.height(),
            fill.unwrap_or("none"),
        ));
    }

    fn hline(&mut self, y: f64, stroke: &str) {
        self.body.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{y:.2}\" x2=\"{:.2}\" y2=\"{y:.2}\" stroke=\"{stroke}\" stroke-dasharray=\"4\"/>\n",
            self.view.x_min, self.view.x_max,
        ));
    }

    fn vline(&mut self, x: f64, stroke: &str) {
        self.body.push_str(&format!(
            "<line x1=\"{x:.2}\" y1=\"{:.2}\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"{stroke}\" stroke-dasharray=\"4\"/>\n",
            self.view.y_min, self.view.y_max,
        ));
    }

    fn polyline(&mut self, points: &str, stroke: &str) {
        self.body.push_str(&format!(
            "<polyline points=\"{points}\" stroke=\"{stroke}\" fill=\"none\"/>\n"
        ));
    }

    fn circle(&mut self, x: f64, y: f64, r: f64, fill: &str) {
        self.body.push_str(&format!(
            "<circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{r}\" fill=\"{fill}\"/>\n"
        ));
    }

    fn text(&mut self, x: f64, y: f64, text: &str) {
        self.body.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-size=\"10\">{text}</text>\n"
        ));
    }

    fn path(&mut self, data: &str) {
        self.body
            .push_str(&format!("<path d=\"{data}\" fill=\"#000000\" fill-opacity=\"0.6\"/>\n"));
    }

    fn finish(self) -> String {
        let margin = 10.0;
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{:.2} {:.2} {:.2} {:.2}\">\n{}</svg>\n",
            self.view.x_min - margin,
            self.view.y_min - margin,
            self.view.width() + 2.0 * margin,
            self.view.height() + 2.0 * margin,
            self.body,
        )
    }
}
