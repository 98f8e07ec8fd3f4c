use std::io::{self, Write};

use packsim::{BatchResults, Particle};

use crate::config::RunPlan;
use crate::util::text::{truncate, truncate_left};

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

/// Outcome rows shown before the list is cut short.
const MAX_RUN_ROWS: usize = 15;

pub fn print_request_summary(plan: &RunPlan) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let params = &plan.params;
    let dims = params.box_dimensions();

    let mut rows = vec![("Particle A", describe_particle(&params.particle_a))];
    match &params.particle_b {
        Some(b) => {
            rows.push(("Particle B", describe_particle(b)));
            rows.push(("Mass fraction B", format!("{}", params.mass_fraction_b)));
        }
        None => rows.push(("Particle B", "none".to_string())),
    }
    rows.push((
        "Lattice",
        format!("{0} × {0} × {1}", params.num_cubes_xy, params.num_cubes_z),
    ));
    rows.push((
        "Box",
        format!("{:.3} × {:.3} × {:.3}", dims.lx, dims.ly, dims.lz),
    ));
    rows.push((
        "Cutoff",
        format!(
            "{} along {}",
            plan.options.cutoff, plan.options.cutoff_direction
        ),
    ));
    rows.push(("Runs", format!("{}", plan.runs)));
    if let Some(threads) = plan.threads {
        rows.push(("Threads", format!("{}", threads)));
    }
    rows.push(("Generator", plan.toolchain.packgen.clone()));
    rows.push(("Extractor", plan.toolchain.matlab.clone()));

    let val_w = SAFE_TABLE_WIDTH.saturating_sub(16 + 6);
    rows.push((
        "Work dir",
        truncate_left(&plan.workdir.display().to_string(), val_w),
    ));

    print_kv_table(&mut out, "Simulation Request", &rows);
}

pub fn print_run_outcomes(batch: &BatchResults) {
    if batch.total_requested == 0 {
        return;
    }

    let stderr = io::stderr();
    let mut out = stderr.lock();

    let run_w = 5usize;
    let items_w = 6usize;
    let phi_w = 8usize;
    let sep_overhead = 12;
    let status_w = SAFE_TABLE_WIDTH.saturating_sub(run_w + items_w + phi_w + sep_overhead);

    let mut rows: Vec<(Option<usize>, String, String, String)> = batch
        .successful
        .iter()
        .map(|r| {
            let packing = &r.extracted_packing;
            let status = if packing.particle_b().is_some() {
                format!("ok, m_B {:.4}", packing.actual_mass_fraction_b())
            } else {
                "ok".to_string()
            };
            (
                r.run_index(),
                format!("{}", packing.item_count()),
                format!("{:.4}", packing.volumetric_filling_fraction()),
                status,
            )
        })
        .collect();
    rows.extend(batch.failures.iter().map(|f| {
        (
            f.index,
            "-".to_string(),
            "-".to_string(),
            format!("{} at {}", f.kind, f.stage.description()),
        )
    }));
    rows.sort_by_key(|row| row.0.unwrap_or(usize::MAX));

    let _ = writeln!(out, "{}┌─ Run Outcomes ─┐", INDENT);
    let _ = writeln!(
        out,
        "{}┌{r_line}┬{i_line}┬{p_line}┬{s_line}┐",
        INDENT,
        r_line = "─".repeat(run_w + 2),
        i_line = "─".repeat(items_w + 2),
        p_line = "─".repeat(phi_w + 2),
        s_line = "─".repeat(status_w + 2)
    );
    let _ = writeln!(
        out,
        "{}│ {:>run_w$} │ {:>items_w$} │ {:>phi_w$} │ {:<status_w$} │",
        INDENT,
        "Run",
        "Items",
        "Filling",
        "Status",
        run_w = run_w,
        items_w = items_w,
        phi_w = phi_w,
        status_w = status_w
    );
    let _ = writeln!(
        out,
        "{}├{r_line}┼{i_line}┼{p_line}┼{s_line}┤",
        INDENT,
        r_line = "─".repeat(run_w + 2),
        i_line = "─".repeat(items_w + 2),
        p_line = "─".repeat(phi_w + 2),
        s_line = "─".repeat(status_w + 2)
    );

    for (index, items, phi, status) in rows.iter().take(MAX_RUN_ROWS) {
        let run = index.map_or_else(|| "pool".to_string(), |i| i.to_string());
        let _ = writeln!(
            out,
            "{}│ {:>run_w$} │ {:>items_w$} │ {:>phi_w$} │ {:<status_w$} │",
            INDENT,
            run,
            items,
            phi,
            truncate(status, status_w),
            run_w = run_w,
            items_w = items_w,
            phi_w = phi_w,
            status_w = status_w
        );
    }

    if rows.len() > MAX_RUN_ROWS {
        let _ = writeln!(
            out,
            "{}│ {:>run_w$} │ {:>items_w$} │ {:>phi_w$} │ {:<status_w$} │",
            INDENT,
            "...",
            "...",
            "...",
            format!("({} more runs)", rows.len() - MAX_RUN_ROWS),
            run_w = run_w,
            items_w = items_w,
            phi_w = phi_w,
            status_w = status_w
        );
    }

    let _ = writeln!(
        out,
        "{}└{r_line}┴{i_line}┴{p_line}┴{s_line}┘",
        INDENT,
        r_line = "─".repeat(run_w + 2),
        i_line = "─".repeat(items_w + 2),
        p_line = "─".repeat(phi_w + 2),
        s_line = "─".repeat(status_w + 2)
    );
}

fn describe_particle(p: &Particle) -> String {
    format!("r {} · t {} · ρ {}", p.radius, p.thickness, p.density)
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{k_line}┬{v_line}┐",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
    let _ = writeln!(
        out,
        "{}│ {:<key_w$} │ {:>val_w$} │",
        INDENT,
        "Parameter",
        "Value",
        key_w = key_w,
        val_w = val_w
    );
    let _ = writeln!(
        out,
        "{}├{k_line}┼{v_line}┤",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );

    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate(val, val_w),
            key_w = key_w,
            val_w = val_w
        );
    }

    let _ = writeln!(
        out,
        "{}└{k_line}┴{v_line}┘",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
}
