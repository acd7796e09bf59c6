/*!

This is the long-form manual for `house_assignment` and the `houses` command.

## Input format

The input is a folder of Excel (`.xlsx`) files, one file per stream. The name
of the file without its extension becomes the `Stream` of every student in it.
Only the first worksheet is read.

The first rows of each worksheet are usually titles. By default the header is
expected on the third row (`headerRow: 2`):

|   | A             | B            | C      | D        | E             |
|---|---------------|--------------|--------|----------|---------------|
| 1 | Student list  |              |        |          |               |
| 2 |               |              |        |          |               |
| 3 | Enrollment No | Student Name | Gender | Semester | Email-ID      |
| 4 | 2301          | Asha         | F      | 1        | asha@mail.org |

The following columns are required: `Enrollment No`, `Student Name`,
`Gender`, `Semester`. Header names are cleaned up before use: line breaks,
tabs and repeated spaces are collapsed into a single space.

## The assignment

Students are grouped by stream, semester and gender. Inside a group, the
students are shuffled and the houses are handed out in turn, so that no house
gets more than one student more than another house of the same group.

The turn starts with the houses that received the fewest students of that
gender so far in the pass. This keeps the houses balanced overall, not only
inside each group.

The assignment is random. Pass `--seed` to `houses` to reproduce a previous
run: the seed of every run is printed in the logs.

## Configuration

A JSON file passed with `--config`. All the keys are optional:

```json
{
  "dataFolder": "Data",
  "headerRow": 2,
  "houses": [
    {"name": "House A", "color": "#FF9999"},
    {"name": "House B", "color": "#99CCFF"},
    {"name": "House C", "color": "#99FF99"},
    {"name": "House D", "color": "#FFCC99"}
  ],
  "genders": ["M", "F"],
  "genderColors": {"M": "#0074D9", "F": "#FF69B4"},
  "defaultColumns": ["Enrollment No", "Student Name", "Email-ID"],
  "adminPasswordSha256": "<hex digest of the admin password>",
  "exportFileName": "final_house_distribution.xlsx",
  "randomSeed": 1234
}
```

The admin password itself is never stored: only its SHA-256 digest, as
printed by `sha256sum` for instance.

## Commands

* `houses view` the raw data, after entering the admin password
* `houses distribution` the house of every student, with the counts per gender
* `houses charts` three SVG charts of the distribution
* `houses export` the distribution as an Excel workbook, one sheet per stream and gender
* `houses check` compares an exported workbook against a reference workbook

*/
