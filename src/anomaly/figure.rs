use crate::anomaly::branch_snps::BranchSnpTable;
use crate::anomaly::types::{BranchConvergence, ReversionScan, SnpRecord};
use crate::config::Config;
use crate::phylo::{BranchId, Tree};
use anyhow::{anyhow, Context, Result};
use image::{Rgba, RgbaImage};
use indexmap::IndexMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const MARGIN_LEFT: f64 = 40.0;
const MARGIN_RIGHT: f64 = 220.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 20.0;

/// Geometry and palette for the annotated tree figures.
#[derive(Debug, Clone)]
pub struct FigureStyle {
    pub width: u32,
    pub height: u32,
    /// Dot color for deamination-signature SNPs (G->A in GA context,
    /// C->T in TC context).
    pub signature_color: String,
    /// Dot color for every other SNP.
    pub snp_color: String,
}

impl FigureStyle {
    pub fn from_config(config: &Config, height_override: Option<u32>, n_tips: usize) -> Self {
        let height = height_override.unwrap_or_else(|| {
            (config.figure_row_height * n_tips.max(2) as u32 + 60).max(240)
        });
        FigureStyle {
            width: config.figure_width,
            height,
            signature_color: config.signature_color.clone(),
            snp_color: config.snp_color.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    /// A branch that undoes an earlier SNP (caret pointing left).
    Reversion,
    /// A branch whose SNP is reverted further down (caret pointing right).
    Origin,
    /// A branch carrying a convergent SNP (diamond).
    Convergent,
}

type Annotations = IndexMap<BranchId, Vec<(String, Marker)>>;

/// Tree figure annotated with reversion and origin markers.
pub fn render_reversion_figure(
    tree: &Tree,
    table: &BranchSnpTable,
    scan: &ReversionScan,
    svg_path: &Path,
    png_path: &Path,
    style: &FigureStyle,
) -> Result<()> {
    let mut annotations = Annotations::new();
    for (branch, alleles) in &scan.branch_reversions {
        for site_allele in alleles {
            annotations
                .entry(branch.clone())
                .or_default()
                .push((site_allele.to_string(), Marker::Reversion));
        }
    }
    for (branch, alleles) in &scan.reverted_origins {
        for site_allele in alleles {
            annotations
                .entry(branch.clone())
                .or_default()
                .push((site_allele.to_string(), Marker::Origin));
        }
    }
    render(tree, table, &annotations, svg_path, png_path, style)
}

/// Tree figure annotated with convergent SNP markers.
pub fn render_convergence_figure(
    tree: &Tree,
    table: &BranchSnpTable,
    convergence: &BranchConvergence,
    svg_path: &Path,
    png_path: &Path,
    style: &FigureStyle,
) -> Result<()> {
    let mut annotations = Annotations::new();
    for (branch, snps) in convergence {
        for snp in snps {
            annotations
                .entry(branch.clone())
                .or_default()
                .push((snp.clone(), Marker::Convergent));
        }
    }
    render(tree, table, &annotations, svg_path, png_path, style)
}

struct Layout {
    x: Vec<f64>,
    y: Vec<f64>,
    n_tips: usize,
}

fn layout(tree: &Tree) -> Layout {
    let n = tree.nodes().len();
    let mut x = vec![0.0; n];
    let mut y = vec![0.0; n];

    for id in 0..n {
        x[id] = tree.height(id);
    }

    let mut next_tip = 0.0;
    for id in 0..n {
        if tree.node(id).is_tip() {
            y[id] = next_tip;
            next_tip += 1.0;
        }
    }
    // Parents precede children in the arena, so a reverse sweep sees every
    // child before its parent.
    for id in (0..n).rev() {
        let node = tree.node(id);
        if !node.is_tip() {
            let sum: f64 = node.children.iter().map(|&c| y[c]).sum();
            y[id] = sum / node.children.len() as f64;
        }
    }

    Layout {
        x,
        y,
        n_tips: next_tip as usize,
    }
}

fn render(
    tree: &Tree,
    table: &BranchSnpTable,
    annotations: &Annotations,
    svg_path: &Path,
    png_path: &Path,
    style: &FigureStyle,
) -> Result<()> {
    let layout = layout(tree);
    let tree_height = tree.tree_height();

    let plot_width = style.width as f64 - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = style.height as f64 - MARGIN_TOP - MARGIN_BOTTOM;
    let x_scale = if tree_height > 0.0 {
        plot_width / tree_height
    } else {
        1.0
    };
    let row_pitch = plot_height / layout.n_tips.max(1) as f64;
    let increment = plot_width / 150.0;

    let px = |v: f64| MARGIN_LEFT + v * x_scale;
    let py = |v: f64| MARGIN_TOP + (v + 0.5) * row_pitch;

    let signature = parse_hex_color(&style.signature_color)
        .ok_or_else(|| anyhow!("invalid signature color '{}'", style.signature_color))?;
    let plain = parse_hex_color(&style.snp_color)
        .ok_or_else(|| anyhow!("invalid snp color '{}'", style.snp_color))?;

    let mut svg = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
    svg.push_str(
        &SvgTag::new("svg")
            .attr("xmlns", "http://www.w3.org/2000/svg")
            .attr("width", style.width)
            .attr("height", style.height)
            .attr("style", "background:#ffffff")
            .render(false),
    );
    svg.push('\n');

    let mut img = RgbaImage::from_pixel(style.width, style.height, Rgba([255, 255, 255, 255]));
    let grey = Rgba([105, 105, 105, 255]);
    let black = Rgba([0, 0, 0, 255]);

    for id in 0..tree.nodes().len() {
        let node = tree.node(id);
        let parent = match node.parent {
            Some(p) => p,
            None => continue,
        };

        let x0 = px(layout.x[parent]);
        let x1 = px(layout.x[id]);
        let y0 = py(layout.y[parent]);
        let y1 = py(layout.y[id]);

        // Rectangular tree: vertical connector at the parent, then the
        // horizontal branch at the child's row.
        svg.push_str(&svg_line(x0, y0, x0, y1, "dimgrey"));
        svg.push_str(&svg_line(x0, y1, x1, y1, "dimgrey"));
        draw_vline(&mut img, x0, y0, y1, grey);
        draw_hline(&mut img, x0, x1, y1, grey);

        if node.is_tip() {
            svg.push_str(
                &SvgTag::new("circle")
                    .attr("cx", fmt_px(x1))
                    .attr("cy", fmt_px(y1))
                    .attr("r", "3.5")
                    .attr("fill", "dimgrey")
                    .render(true),
            );
            svg.push('\n');
            svg.push_str(&svg_text(
                x1 + increment * 4.0,
                y1 + 4.0,
                &node.label,
                false,
            ));
            fill_circle(&mut img, x1, y1, 3.5, grey);
        }

        if node.label.is_empty() || tree.node(parent).label.is_empty() {
            continue;
        }
        let branch = BranchId::new(tree.node(parent).label.clone(), node.label.clone());

        // SNP dots above the branch, deamination-signature dots first.
        let mut dots: Vec<(u8, [u8; 3])> = table
            .snps(&branch)
            .iter()
            .map(|record| match snp_dot_class(record) {
                1 => (1, signature),
                _ => (2, plain),
            })
            .collect();
        dots.sort_by_key(|(class, _)| *class);
        let mut dot_x = x0 + increment;
        for (_, color) in &dots {
            svg.push_str(
                &SvgTag::new("circle")
                    .attr("cx", fmt_px(dot_x))
                    .attr("cy", fmt_px(y1 - 5.0))
                    .attr("r", "3")
                    .attr("fill", format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2]))
                    .render(true),
            );
            svg.push('\n');
            fill_circle(&mut img, dot_x, y1 - 5.0, 3.0, Rgba([color[0], color[1], color[2], 255]));
            dot_x += increment;
        }

        // Mid-branch anomaly markers with vertical text.
        if let Some(marks) = annotations.get(&branch) {
            let mut marker_x = (x0 + x1) / 2.0;
            for (text, marker) in marks {
                svg.push_str(&svg_marker(marker_x, y1, *marker));
                svg.push_str(&svg_text(marker_x + 4.0, y1 - 8.0, text, true));
                draw_marker(&mut img, marker_x, y1, *marker, black);
                marker_x += match marker {
                    Marker::Convergent => increment * 2.0,
                    _ => increment * 3.0,
                };
            }
        }
    }

    svg.push_str("</svg>\n");

    let mut svg_file = File::create(svg_path)
        .with_context(|| format!("cannot create {}", svg_path.display()))?;
    svg_file.write_all(svg.as_bytes())?;

    img.save(png_path)
        .with_context(|| format!("cannot write {}", png_path.display()))?;

    Ok(())
}

/// 1 for the deamination-signature substitutions, 2 for everything else.
fn snp_dot_class(record: &SnpRecord) -> u8 {
    match (record.snp.as_str(), record.dimer.as_str()) {
        ("G->A", "GA") | ("C->T", "TC") => 1,
        _ => 2,
    }
}

struct SvgTag {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
}

impl SvgTag {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
        }
    }

    fn attr(mut self, key: &'static str, value: impl ToString) -> Self {
        self.attributes.push((key, value.to_string()));
        self
    }

    fn render(&self, self_closing: bool) -> String {
        let attrs: String = self
            .attributes
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_xml(v)))
            .collect::<Vec<_>>()
            .join(" ");

        if self_closing {
            format!("<{} {}/>", self.name, attrs)
        } else {
            format!("<{} {}>", self.name, attrs)
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('\'', "&apos;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn fmt_px(v: f64) -> String {
    format!("{:.1}", v)
}

fn svg_line(x0: f64, y0: f64, x1: f64, y1: f64, stroke: &str) -> String {
    let mut s = SvgTag::new("line")
        .attr("x1", fmt_px(x0))
        .attr("y1", fmt_px(y0))
        .attr("x2", fmt_px(x1))
        .attr("y2", fmt_px(y1))
        .attr("stroke", stroke)
        .attr("stroke-width", 1)
        .render(true);
    s.push('\n');
    s
}

fn svg_text(x: f64, y: f64, content: &str, vertical: bool) -> String {
    let mut tag = SvgTag::new("text")
        .attr("x", fmt_px(x))
        .attr("y", fmt_px(y))
        .attr("font-size", 11)
        .attr("font-family", "sans-serif");
    if vertical {
        tag = tag.attr(
            "transform",
            format!("rotate(-90 {} {})", fmt_px(x), fmt_px(y)),
        );
    }
    format!("{}{}</text>\n", tag.render(false), escape_xml(content))
}

fn svg_marker(x: f64, y: f64, marker: Marker) -> String {
    let points = match marker {
        Marker::Reversion => format!(
            "{},{} {},{} {},{}",
            fmt_px(x - 5.0),
            fmt_px(y),
            fmt_px(x + 4.0),
            fmt_px(y - 5.0),
            fmt_px(x + 4.0),
            fmt_px(y + 5.0)
        ),
        Marker::Origin => format!(
            "{},{} {},{} {},{}",
            fmt_px(x + 5.0),
            fmt_px(y),
            fmt_px(x - 4.0),
            fmt_px(y - 5.0),
            fmt_px(x - 4.0),
            fmt_px(y + 5.0)
        ),
        Marker::Convergent => format!(
            "{},{} {},{} {},{} {},{}",
            fmt_px(x),
            fmt_px(y - 5.0),
            fmt_px(x + 5.0),
            fmt_px(y),
            fmt_px(x),
            fmt_px(y + 5.0),
            fmt_px(x - 5.0),
            fmt_px(y)
        ),
    };
    let mut s = SvgTag::new("polygon")
        .attr("points", points)
        .attr("fill", "black")
        .render(true);
    s.push('\n');
    s
}

fn parse_hex_color(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

fn put_pixel(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_hline(img: &mut RgbaImage, x0: f64, x1: f64, y: f64, color: Rgba<u8>) {
    let (a, b) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
    let y = y.round() as i64;
    for x in a.round() as i64..=b.round() as i64 {
        put_pixel(img, x, y, color);
    }
}

fn draw_vline(img: &mut RgbaImage, x: f64, y0: f64, y1: f64, color: Rgba<u8>) {
    let (a, b) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
    let x = x.round() as i64;
    for y in a.round() as i64..=b.round() as i64 {
        put_pixel(img, x, y, color);
    }
}

fn fill_circle(img: &mut RgbaImage, cx: f64, cy: f64, r: f64, color: Rgba<u8>) {
    let r_sq = r * r;
    let span = r.ceil() as i64;
    let (cx_i, cy_i) = (cx.round() as i64, cy.round() as i64);
    for dy in -span..=span {
        for dx in -span..=span {
            if (dx * dx + dy * dy) as f64 <= r_sq {
                put_pixel(img, cx_i + dx, cy_i + dy, color);
            }
        }
    }
}

// Raster markers carry no text; the SVG is the annotated artifact. Squares
// for reversion/origin carets, a circle for convergence diamonds.
fn draw_marker(img: &mut RgbaImage, x: f64, y: f64, marker: Marker, color: Rgba<u8>) {
    match marker {
        Marker::Convergent => fill_circle(img, x, y, 4.0, color),
        _ => {
            let (x_i, y_i) = (x.round() as i64, y.round() as i64);
            for dy in -3..=3 {
                for dx in -3..=3 {
                    put_pixel(img, x_i + dx, y_i + dy, color);
                }
            }
        }
    }
}
