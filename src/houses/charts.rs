// The visualization page: three SVG charts of an assigned roster.

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;
use std::fs;

use crate::houses::assign::assign_roster;
use crate::houses::config_reader::HousesConfig;
use crate::houses::filters::{filter_gender, keep_values, GenderChoice};
use crate::houses::io_common::parse_hex_color;
use crate::houses::roster::Roster;
use crate::houses::*;

pub const HOUSE_BY_STREAM_FILE: &str = "house_by_stream.svg";
pub const GENDER_BY_HOUSE_FILE: &str = "gender_by_house.svg";
pub const HOUSE_SHARE_FILE: &str = "house_share.svg";

const CHART_SIZE: (u32, u32) = (900, 540);
const PIE_SIZE: (u32, u32) = (600, 600);

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChartSelection {
    /// Empty means all the streams.
    pub streams: Vec<String>,
    pub gender: GenderChoice,
}

/// The counts behind the three charts.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChartData {
    pub streams: Vec<String>,
    /// All the houses of the palette, in palette order.
    pub houses: Vec<String>,
    pub genders: Vec<String>,
    /// by_stream[stream][house]
    pub by_stream: Vec<Vec<u64>>,
    /// by_house[house][gender]
    pub by_house: Vec<Vec<u64>>,
    /// The number of students of each house.
    pub totals: Vec<u64>,
}

impl ChartData {
    pub fn students(&self) -> u64 {
        self.totals.iter().sum()
    }
}

fn count_where(roster: &Roster, conditions: &[(&str, &str)]) -> u64 {
    (0..roster.len())
        .filter(|idx| conditions.iter().all(|(c, v)| roster.text(*idx, c) == *v))
        .count() as u64
}

/// Counts an assigned roster that was already filtered.
/// Returns `None` when there is nobody left.
pub fn chart_data(
    filtered: &Roster,
    config: &HousesConfig,
    palette: &HousePalette,
) -> Option<ChartData> {
    if filtered.is_empty() {
        return None;
    }
    let streams = filtered.distinct_text(STREAM_COL);
    let houses: Vec<String> = palette.houses.iter().map(|h| h.name.clone()).collect();
    let present = filtered.distinct_text(GENDER_COL);
    // Configured genders first, then whatever else the files contain.
    let mut genders: Vec<String> = config
        .genders
        .iter()
        .filter(|g| present.contains(g))
        .cloned()
        .collect();
    genders.extend(present.into_iter().filter(|g| !config.genders.contains(g)));

    let by_stream = streams
        .iter()
        .map(|s| {
            houses
                .iter()
                .map(|h| count_where(filtered, &[(STREAM_COL, s), (HOUSE_COL, h)]))
                .collect()
        })
        .collect();
    let by_house = houses
        .iter()
        .map(|h| {
            genders
                .iter()
                .map(|g| count_where(filtered, &[(HOUSE_COL, h), (GENDER_COL, g)]))
                .collect()
        })
        .collect();
    let totals = houses
        .iter()
        .map(|h| count_where(filtered, &[(HOUSE_COL, h)]))
        .collect();
    Some(ChartData {
        streams,
        houses,
        genders,
        by_stream,
        by_house,
        totals,
    })
}

/// Assigns the houses, then keeps the selected streams and gender.
pub fn chart_page(
    roster: &Roster,
    selection: &ChartSelection,
    seed: u64,
    config: &HousesConfig,
    palette: &HousePalette,
) -> HousesResult<Option<ChartData>> {
    let assigned = assign_roster(roster, palette, seed)?;
    let filtered = filter_gender(&assigned.roster, &selection.gender);
    let filtered = keep_values(&filtered, STREAM_COL, &selection.streams);
    debug!(
        "chart_page: {:?}: {} of {} students",
        selection,
        filtered.len(),
        assigned.roster.len()
    );
    Ok(chart_data(&filtered, config, palette))
}

pub fn render_summary(data: &ChartData) -> String {
    let mut out = String::new();
    out.push_str(&format!("Students: {}\n", data.students()));
    out.push_str("House count per stream\n");
    for (s, counts) in data.streams.iter().zip(data.by_stream.iter()) {
        let cells: Vec<String> = data
            .houses
            .iter()
            .zip(counts.iter())
            .map(|(h, n)| format!("{}: {}", h, n))
            .collect();
        out.push_str(&format!("  {}: {}\n", s, cells.join(", ")));
    }
    out.push_str("Gender within houses\n");
    for (h, counts) in data.houses.iter().zip(data.by_house.iter()) {
        let cells: Vec<String> = data
            .genders
            .iter()
            .zip(counts.iter())
            .map(|(g, n)| format!("{}: {}", g, n))
            .collect();
        out.push_str(&format!("  {}: {}\n", h, cells.join(", ")));
    }
    out.push_str("Overall house proportion\n");
    let total = data.students().max(1) as f64;
    for (h, n) in data.houses.iter().zip(data.totals.iter()) {
        out.push_str(&format!(
            "  {}: {} ({:.1}%)\n",
            h,
            n,
            100.0 * (*n as f64) / total
        ));
    }
    out
}

fn rgb(color: &str) -> HousesResult<RGBColor> {
    let (r, g, b) = parse_hex_color(color)?;
    Ok(RGBColor(r, g, b))
}

type DrawResult = Result<(), Box<dyn std::error::Error>>;

fn axis_top(max: u64) -> f64 {
    (max.max(1) as f64) * 1.15
}

fn label_style<'a>() -> TextStyle<'a> {
    TextStyle::from(("sans-serif", 14).into_font()).pos(Pos::new(HPos::Center, VPos::Top))
}

fn draw_house_by_stream(
    data: &ChartData,
    house_colors: &[RGBColor],
    path: &Path,
) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let n = data.streams.len() as f64;
    let top = axis_top(data.by_stream.iter().flatten().cloned().max().unwrap_or(0));
    // Below zero: room for the stream names.
    let bottom = -top * 0.08;
    let mut chart = ChartBuilder::on(&root)
        .caption("House Distribution by Stream", ("sans-serif", 24))
        .margin(15)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..n, bottom..top)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .y_desc("Students")
        .y_label_formatter(&|y| {
            if *y < 0.0 {
                String::new()
            } else {
                format!("{:.0}", y)
            }
        })
        .draw()?;

    let width = 0.8 / data.houses.len().max(1) as f64;
    for (h, house) in data.houses.iter().enumerate() {
        let color = house_colors[h];
        let bars = data.by_stream.iter().enumerate().map(move |(s, counts)| {
            let x0 = s as f64 + 0.1 + h as f64 * width;
            Rectangle::new([(x0, 0.0), (x0 + width, counts[h] as f64)], color.filled())
        });
        chart
            .draw_series(bars)?
            .label(house.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    let names = data.streams.iter().enumerate().map(|(s, name)| {
        Text::new(
            name.clone(),
            (s as f64 + 0.5, bottom * 0.2),
            label_style(),
        )
    });
    chart.draw_series(names)?;
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

fn draw_gender_by_house(
    data: &ChartData,
    gender_colors: &[RGBColor],
    path: &Path,
) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let n = data.houses.len() as f64;
    let top = axis_top(data.totals.iter().cloned().max().unwrap_or(0));
    let bottom = -top * 0.08;
    let mut chart = ChartBuilder::on(&root)
        .caption("Gender Breakdown per House", ("sans-serif", 24))
        .margin(15)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..n, bottom..top)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .y_desc("Students")
        .y_label_formatter(&|y| {
            if *y < 0.0 {
                String::new()
            } else {
                format!("{:.0}", y)
            }
        })
        .draw()?;

    for (g, gender) in data.genders.iter().enumerate() {
        let color = gender_colors[g];
        let bars = data.by_house.iter().enumerate().map(move |(h, counts)| {
            let below: u64 = counts[..g].iter().sum();
            let x0 = h as f64 + 0.2;
            Rectangle::new(
                [(x0, below as f64), (x0 + 0.6, (below + counts[g]) as f64)],
                color.filled(),
            )
        });
        chart
            .draw_series(bars)?
            .label(gender.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    let names = data.houses.iter().enumerate().map(|(h, name)| {
        Text::new(
            name.clone(),
            (h as f64 + 0.5, bottom * 0.2),
            label_style(),
        )
    });
    chart.draw_series(names)?;
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

fn arc_point(center: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        center.0 + (radius * angle.cos()).round() as i32,
        center.1 + (radius * angle.sin()).round() as i32,
    )
}

fn draw_house_share(data: &ChartData, house_colors: &[RGBColor], path: &Path) -> DrawResult {
    let root = SVGBackend::new(path, PIE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled("Overall House Distribution", ("sans-serif", 24))?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = (w.min(h) as f64) * 0.38;
    let total = data.students().max(1) as f64;

    // Slices start at twelve o'clock and go clockwise.
    let mut start = -PI / 2.0;
    for (idx, n) in data.totals.iter().enumerate() {
        if *n == 0 {
            continue;
        }
        let sweep = 2.0 * PI * (*n as f64) / total;
        let steps = ((sweep / (2.0 * PI)) * 120.0).ceil().max(2.0) as usize;
        let mut points = vec![center];
        for i in 0..=steps {
            points.push(arc_point(
                center,
                radius,
                start + sweep * (i as f64) / (steps as f64),
            ));
        }
        area.draw(&Polygon::new(points, house_colors[idx].filled()))?;

        let label = format!(
            "{} ({:.1}%)",
            data.houses[idx],
            100.0 * (*n as f64) / total
        );
        let anchor = arc_point(center, radius * 0.62, start + sweep / 2.0);
        area.draw(&Text::new(
            label,
            anchor,
            TextStyle::from(("sans-serif", 14).into_font())
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;
        start += sweep;
    }
    root.present()?;
    Ok(())
}

/// Writes the three charts in `out_dir` and returns their paths.
pub fn render_charts(
    data: &ChartData,
    out_dir: &Path,
    config: &HousesConfig,
    palette: &HousePalette,
) -> HousesResult<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).context(CreatingOutputSnafu {
        path: out_dir.display().to_string(),
    })?;
    let house_colors = palette
        .houses
        .iter()
        .map(|h| rgb(&h.color))
        .collect::<HousesResult<Vec<RGBColor>>>()?;
    let gender_colors = data
        .genders
        .iter()
        .map(|g| rgb(config.gender_color(g)))
        .collect::<HousesResult<Vec<RGBColor>>>()?;

    let by_stream = out_dir.join(HOUSE_BY_STREAM_FILE);
    let by_house = out_dir.join(GENDER_BY_HOUSE_FILE);
    let share = out_dir.join(HOUSE_SHARE_FILE);
    let jobs: [(&PathBuf, DrawResult); 3] = [
        (
            &by_stream,
            draw_house_by_stream(data, &house_colors, &by_stream),
        ),
        (
            &by_house,
            draw_gender_by_house(data, &gender_colors, &by_house),
        ),
        (&share, draw_house_share(data, &house_colors, &share)),
    ];
    let mut res: Vec<PathBuf> = Vec::new();
    for (path, outcome) in jobs {
        if let Err(e) = outcome {
            return RenderChartSnafu {
                path: path.display().to_string(),
                message: e.to_string(),
            }
            .fail();
        }
        info!("render_charts: wrote {:?}", path);
        res.push(path.clone());
    }
    Ok(res)
}
