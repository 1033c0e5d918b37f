use itertools::izip;

/// A plain text table with a header row, used to print metrics to a terminal.
pub struct Table {
	padding: usize,
	header: Vec<String>,
	rows: Vec<Vec<String>>,
}

impl Table {
	pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
		Self {
			padding: 1,
			header,
			rows,
		}
	}

	pub fn with_padding(mut self, padding: usize) -> Self {
		self.padding = padding;
		self
	}
}

impl std::fmt::Display for Table {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		// update column widths with header
		let mut column_widths: Vec<usize> = self.header.iter().map(|header| header.len()).collect();
		// update column widths with values
		for row in self.rows.iter() {
			for (column_width, value) in izip!(column_widths.iter_mut(), row.iter()) {
				*column_width = usize::max(*column_width, value.len());
			}
		}
		let line = Line {
			column_widths: &column_widths,
			padding: self.padding,
		};
		let header = Row {
			column_widths: &column_widths,
			padding: self.padding,
			values: &self.header,
		};
		writeln!(f, "{}", header)?;
		writeln!(f, "{}", line)?;
		for values in self.rows.iter() {
			let row = Row {
				column_widths: &column_widths,
				padding: self.padding,
				values,
			};
			writeln!(f, "{}", row)?;
		}
		Ok(())
	}
}

struct Line<'a> {
	column_widths: &'a [usize],
	padding: usize,
}

impl<'a> std::fmt::Display for Line<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for column_width in self.column_widths.iter() {
			write!(f, "{}|", "-".repeat(column_width + 2 * self.padding))?;
		}
		Ok(())
	}
}

struct Row<'a> {
	column_widths: &'a [usize],
	padding: usize,
	values: &'a [String],
}

impl<'a> std::fmt::Display for Row<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for (column_width, value) in izip!(self.column_widths.iter(), self.values.iter()) {
			let trailing = column_width + self.padding - value.len();
			write!(
				f,
				"{}{}{}|",
				" ".repeat(self.padding),
				value,
				" ".repeat(trailing)
			)?;
		}
		Ok(())
	}
}

#[test]
fn test_table() {
	let header = vec!["metric".to_owned(), "A".to_owned(), "B".to_owned()];
	let rows = vec![
		vec!["precision".to_owned(), "0.5".to_owned(), "1.0".to_owned()],
		vec!["recall".to_owned(), "0.667".to_owned(), "0.75".to_owned()],
	];
	let table = Table::new(header, rows).to_string();
	assert_eq!(
		table,
		concat!(
			"| metric    | A     | B    |\n",
			"|-----------|-------|------|\n",
			"| precision | 0.5   | 1.0  |\n",
			"| recall    | 0.667 | 0.75 |\n",
		)
	);
}

#[test]
fn test_padding() {
	let table = Table::new(vec!["a".to_owned()], vec![vec!["bc".to_owned()]])
		.with_padding(0)
		.to_string();
	assert_eq!(table, "|a |\n|--|\n|bc|\n");
}
